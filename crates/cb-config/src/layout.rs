//! Fixed locations inside a Code Battles project.

use std::path::PathBuf;

/// Public asset directory, served as the site root.
const PUBLIC_DIR: &str = "public";
/// Python sources directory inside the public tree.
const SCRIPTS_DIR: &str = "scripts";
/// Generated PyScript manifest inside the public tree.
const MANIFEST_FILENAME: &str = "config.json";
/// Single-file output of the Python packer, inside the scripts directory.
pub const PACKED_FILENAME: &str = "packed.py";
/// Entry file handed to the documentation generator.
const API_FILENAME: &str = "api.py";

/// Absolute paths of every location the toolchain reads or writes.
///
/// All operations take their paths from here instead of relying on the
/// process working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Project root (the directory holding `public/`, `src/` and `node_modules/`).
    pub root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn public_dir(&self) -> PathBuf {
        self.root.join(PUBLIC_DIR)
    }

    /// Directory scanned for the manifest and watched during development.
    #[must_use]
    pub fn scripts_dir(&self) -> PathBuf {
        self.public_dir().join(SCRIPTS_DIR)
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.public_dir().join(MANIFEST_FILENAME)
    }

    #[must_use]
    pub fn packed_path(&self) -> PathBuf {
        self.scripts_dir().join(PACKED_FILENAME)
    }

    /// Module documented by the API reference.
    #[must_use]
    pub fn api_entry_path(&self) -> PathBuf {
        self.scripts_dir().join(API_FILENAME)
    }

    /// Prebuilt assets shipped by the `code-battles` npm package.
    #[must_use]
    pub fn dependency_dist_dir(&self) -> PathBuf {
        self.root
            .join("node_modules")
            .join("code-battles")
            .join("dist")
    }

    #[must_use]
    pub fn docs_template_dir(&self) -> PathBuf {
        self.dependency_dist_dir().join("pdoc-template")
    }

    /// Link pairs as `(target, source)`: where the link lives, and what it points to.
    #[must_use]
    pub fn asset_links(&self) -> [(PathBuf, PathBuf); 2] {
        let dist = self.dependency_dist_dir();
        [
            (self.scripts_dir().join("code_battles"), dist.join("code_battles")),
            (self.public_dir().join("pyscript"), dist.join("pyscript")),
        ]
    }

    #[must_use]
    pub fn firebase_source(&self) -> PathBuf {
        self.root.join("src").join("firebase.json")
    }

    #[must_use]
    pub fn firebase_destination(&self) -> PathBuf {
        self.public_dir().join("firebase-configuration.json")
    }

    /// Files the documentation generator leaves behind that the site does not use.
    #[must_use]
    pub fn docs_leftovers(&self) -> [PathBuf; 2] {
        let public = self.public_dir();
        [public.join("index.html"), public.join("search.js")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = ProjectLayout::new("/site");

        assert_eq!(layout.public_dir(), PathBuf::from("/site/public"));
        assert_eq!(layout.scripts_dir(), PathBuf::from("/site/public/scripts"));
        assert_eq!(layout.manifest_path(), PathBuf::from("/site/public/config.json"));
        assert_eq!(
            layout.packed_path(),
            PathBuf::from("/site/public/scripts/packed.py")
        );
        assert_eq!(
            layout.api_entry_path(),
            PathBuf::from("/site/public/scripts/api.py")
        );
        assert_eq!(
            layout.docs_template_dir(),
            PathBuf::from("/site/node_modules/code-battles/dist/pdoc-template")
        );
        assert_eq!(
            layout.firebase_destination(),
            PathBuf::from("/site/public/firebase-configuration.json")
        );
    }

    #[test]
    fn test_asset_links() {
        let layout = ProjectLayout::new("/site");
        let [scripts, pyscript] = layout.asset_links();

        assert_eq!(scripts.0, PathBuf::from("/site/public/scripts/code_battles"));
        assert_eq!(
            scripts.1,
            PathBuf::from("/site/node_modules/code-battles/dist/code_battles")
        );
        assert_eq!(pyscript.0, PathBuf::from("/site/public/pyscript"));
        assert_eq!(
            pyscript.1,
            PathBuf::from("/site/node_modules/code-battles/dist/pyscript")
        );
    }
}
