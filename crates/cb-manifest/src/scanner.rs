//! Python source discovery by filesystem walking.
//!
//! Listing and filtering are separate steps: [`SourceScanner::list`] returns
//! every file below the root, and [`SourceScanner::is_eligible`] decides which
//! of them belong in the manifest.

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::SyncError;

/// Directory name holding Python bytecode caches.
pub const CACHE_DIR: &str = "__pycache__";

/// Python source extension.
const SOURCE_EXTENSION: &str = "py";

/// Python stub extension.
const STUB_EXTENSION: &str = "pyi";

/// Discovers Python sources below a root directory.
///
/// Relative paths are always reported with `/` separators so that manifest
/// keys do not depend on the host platform.
#[derive(Debug, Clone)]
pub struct SourceScanner {
    root: PathBuf,
    include_stubs: bool,
    artifact_name: Option<String>,
}

impl SourceScanner {
    /// Create a scanner for `root`.
    ///
    /// Only `.py` files are eligible by default.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_stubs: false,
            artifact_name: None,
        }
    }

    /// Also treat `.pyi` stub files as eligible.
    #[must_use]
    pub fn with_stubs(mut self, include_stubs: bool) -> Self {
        self.include_stubs = include_stubs;
        self
    }

    /// Exclude files with this name (the packer output) wherever they appear.
    #[must_use]
    pub fn with_artifact(mut self, name: impl Into<String>) -> Self {
        self.artifact_name = Some(name.into());
        self
    }

    /// List every file below the root as sorted, `/`-separated relative paths.
    ///
    /// Directory symlinks are followed; a link back into one of its own
    /// ancestors is skipped. Unreadable entries and names that are not valid
    /// UTF-8 are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ScanRootMissing`] if the root is not a directory.
    pub fn list(&self) -> Result<Vec<String>, SyncError> {
        if !self.root.is_dir() {
            return Err(SyncError::ScanRootMissing(self.root.clone()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable source entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            match relative_key(&self.root, entry.path()) {
                Some(relative) => files.push(relative),
                None => {
                    tracing::warn!(path = %entry.path().display(), "Skipping file with a non UTF-8 name");
                }
            }
        }

        files.sort_unstable();
        Ok(files)
    }

    /// List eligible sources as sorted, `/`-separated relative paths.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ScanRootMissing`] if the root is not a directory.
    pub fn scan(&self) -> Result<Vec<String>, SyncError> {
        let mut files = self.list()?;
        files.retain(|relative| self.is_eligible(relative));
        Ok(files)
    }

    /// Check whether a `/`-separated relative path belongs in the manifest.
    pub fn is_eligible(&self, relative: &str) -> bool {
        let mut segments = relative.split('/');
        if segments.any(|segment| segment == CACHE_DIR) {
            return false;
        }

        let file_name = relative.rsplit('/').next().unwrap_or(relative);
        if self.artifact_name.as_deref() == Some(file_name) {
            return false;
        }

        match Path::new(file_name).extension() {
            Some(ext) if ext == SOURCE_EXTENSION => true,
            Some(ext) if ext == STUB_EXTENSION => self.include_stubs,
            _ => false,
        }
    }

    /// Check whether an absolute path reported by a file watcher is an
    /// eligible source below the root.
    pub fn is_tracked(&self, path: &Path) -> bool {
        relative_key(&self.root, path).is_some_and(|relative| self.is_eligible(&relative))
    }

    /// Check whether a directory reported by a file watcher may hold sources:
    /// it lies below the root and outside any bytecode cache.
    pub fn is_tracked_dir(&self, path: &Path) -> bool {
        relative_key(&self.root, path)
            .is_some_and(|relative| !relative.split('/').any(|segment| segment == CACHE_DIR))
    }
}

/// Convert an absolute path below `root` into a `/`-separated relative key.
///
/// Returns `None` for paths outside `root` and for names that are not valid
/// UTF-8, which could not be fetched through a manifest URL anyway.
pub(crate) fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut segments = Vec::new();
    for component in relative.components() {
        if let Component::Normal(segment) = component {
            segments.push(segment.to_str()?);
        }
    }

    (!segments.is_empty()).then(|| segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_list_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = SourceScanner::new(dir.path().join("missing"));

        let err = scanner.list().unwrap_err();
        assert!(matches!(err, SyncError::ScanRootMissing(_)));
    }

    #[test]
    fn test_list_is_sorted_and_recursive() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "z.py");
        touch(dir.path(), "b/c.py");
        touch(dir.path(), "a.py");
        touch(dir.path(), "b/a/deep.txt");

        let files = SourceScanner::new(dir.path()).list().unwrap();

        assert_eq!(files, vec!["a.py", "b/a/deep.txt", "b/c.py", "z.py"]);
    }

    #[test]
    fn test_scan_filters_cache_and_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.py");
        touch(dir.path(), "b/c.py");
        touch(dir.path(), "b/__pycache__/d.py");
        touch(dir.path(), "b/__pycache__/c.cpython-312.pyc");
        touch(dir.path(), "notes.md");
        touch(dir.path(), "types.pyi");

        let files = SourceScanner::new(dir.path()).scan().unwrap();

        assert_eq!(files, vec!["a.py", "b/c.py"]);
    }

    #[test]
    fn test_scan_includes_stubs_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.py");
        touch(dir.path(), "types.pyi");

        let files = SourceScanner::new(dir.path())
            .with_stubs(true)
            .scan()
            .unwrap();

        assert_eq!(files, vec!["a.py", "types.pyi"]);
    }

    #[test]
    fn test_scan_excludes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "main.py");
        touch(dir.path(), "packed.py");

        let files = SourceScanner::new(dir.path())
            .with_artifact("packed.py")
            .scan()
            .unwrap();

        assert_eq!(files, vec!["main.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_follows_directory_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("package");
        touch(&package, "code_battles/__init__.py");
        let scripts = dir.path().join("scripts");
        fs::create_dir_all(&scripts).unwrap();
        std::os::unix::fs::symlink(package.join("code_battles"), scripts.join("code_battles"))
            .unwrap();

        let files = SourceScanner::new(&scripts).scan().unwrap();

        assert_eq!(files, vec!["code_battles/__init__.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_skips_symlink_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let scripts = dir.path().join("scripts");
        touch(&scripts, "a.py");
        std::os::unix::fs::symlink(&scripts, scripts.join("loop")).unwrap();
        std::os::unix::fs::symlink(".", scripts.join("again")).unwrap();

        let files = SourceScanner::new(&scripts).scan().unwrap();

        assert_eq!(files, vec!["a.py"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_list_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.py");
        fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff.py")), "").unwrap();

        let files = SourceScanner::new(dir.path()).scan().unwrap();

        assert_eq!(files, vec!["a.py"]);
    }

    #[test]
    fn test_is_eligible_nested_cache_segment() {
        let scanner = SourceScanner::new("/scripts");

        assert!(!scanner.is_eligible("__pycache__/a.py"));
        assert!(!scanner.is_eligible("x/__pycache__/y/a.py"));
        assert!(scanner.is_eligible("x/not__pycache__/a.py"));
    }

    #[test]
    fn test_is_tracked() {
        let scanner = SourceScanner::new("/site/public/scripts").with_artifact("packed.py");

        assert!(scanner.is_tracked(Path::new("/site/public/scripts/main.py")));
        assert!(scanner.is_tracked(Path::new("/site/public/scripts/bots/a.py")));
        assert!(!scanner.is_tracked(Path::new("/site/public/scripts/packed.py")));
        assert!(!scanner.is_tracked(Path::new("/site/public/other.py")));
        assert!(!scanner.is_tracked(Path::new("/site/public/scripts")));
        assert!(!scanner.is_tracked(Path::new("/site/public/scripts/readme.md")));
    }

    #[test]
    fn test_is_tracked_dir() {
        let scanner = SourceScanner::new("/site/public/scripts");

        assert!(scanner.is_tracked_dir(Path::new("/site/public/scripts/bots")));
        assert!(scanner.is_tracked_dir(Path::new("/site/public/scripts/a/b")));
        assert!(!scanner.is_tracked_dir(Path::new("/site/public/scripts/a/__pycache__")));
        assert!(!scanner.is_tracked_dir(Path::new("/site/public/scripts")));
        assert!(!scanner.is_tracked_dir(Path::new("/site/public/images")));
    }

    #[test]
    fn test_relative_key() {
        assert_eq!(
            relative_key(Path::new("/root"), Path::new("/root/a/b.py")),
            Some("a/b.py".to_owned())
        );
        assert_eq!(relative_key(Path::new("/root"), Path::new("/other/b.py")), None);
        assert_eq!(relative_key(Path::new("/root"), Path::new("/root")), None);
    }
}
