//! Manifest document type and its on-disk representation.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::SyncError;

/// Public URL prefix under which the scripts directory is served.
pub const URL_PREFIX: &str = "/scripts/";

/// Indentation used when writing the manifest.
const INDENT: &[u8] = b"    ";

/// Options merged into the manifest.
///
/// `None` leaves the field out of the manifest entirely; `Some(vec![])`
/// writes an explicit empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestOptions {
    /// Extra packages for the in-browser interpreter, in order, duplicates kept.
    pub packages: Option<Vec<String>>,
    /// Interpreter version; ignored when empty.
    pub interpreter: Option<String>,
}

/// PyScript configuration listing every Python source of the site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Public URL (`/scripts/<path>`) to relative fetch path (`./<path>`).
    pub files: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
}

impl Manifest {
    /// Build a manifest from `/`-separated relative source paths.
    pub fn build<'a>(
        sources: impl IntoIterator<Item = &'a str>,
        options: &ManifestOptions,
    ) -> Self {
        let files = sources
            .into_iter()
            .map(|relative| (format!("{URL_PREFIX}{relative}"), format!("./{relative}")))
            .collect();

        Self {
            files,
            packages: options.packages.clone(),
            interpreter: options
                .interpreter
                .clone()
                .filter(|interpreter| !interpreter.is_empty()),
        }
    }

    /// Render as 4-space indented JSON.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
        self.serialize(&mut serializer)?;
        // serde_json only ever emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Read the document currently on disk.
///
/// A missing file reads as an empty object. Any JSON value is accepted, so
/// that comparison with a new manifest sees exactly what the file holds.
pub(crate) fn load_document(path: &Path) -> Result<Value, SyncError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        Err(source) => {
            return Err(SyncError::ReadFailure {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_slice(&bytes).map_err(|source| SyncError::ConfigCorrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace `path` with `content` atomically: write a sibling temp file, then rename.
pub(crate) fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("json.tmp");
    let result = write_file(&temp_path, content).and_then(|()| fs::rename(&temp_path, path));

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_file(path: &Path, content: &str) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_maps_urls_to_relative_paths() {
        let manifest = Manifest::build(["a.py", "b/c.py"], &ManifestOptions::default());

        assert_eq!(manifest.files.len(), 2);
        assert_eq!(manifest.files["/scripts/a.py"], "./a.py");
        assert_eq!(manifest.files["/scripts/b/c.py"], "./b/c.py");
        assert!(manifest.packages.is_none());
        assert!(manifest.interpreter.is_none());
    }

    #[test]
    fn test_build_keeps_packages_verbatim() {
        let options = ManifestOptions {
            packages: Some(vec!["numpy".to_owned(), "pandas".to_owned(), "numpy".to_owned()]),
            interpreter: None,
        };

        let manifest = Manifest::build([], &options);

        assert_eq!(
            manifest.packages,
            Some(vec!["numpy".to_owned(), "pandas".to_owned(), "numpy".to_owned()])
        );
    }

    #[test]
    fn test_build_ignores_empty_interpreter() {
        let options = ManifestOptions {
            packages: None,
            interpreter: Some(String::new()),
        };

        assert!(Manifest::build([], &options).interpreter.is_none());
    }

    #[test]
    fn test_pretty_json_format() {
        let options = ManifestOptions {
            packages: Some(vec!["numpy".to_owned()]),
            interpreter: Some("0.26.2".to_owned()),
        };
        let manifest = Manifest::build(["a.py"], &options);

        let expected = r#"{
    "files": {
        "/scripts/a.py": "./a.py"
    },
    "packages": [
        "numpy"
    ],
    "interpreter": "0.26.2"
}"#;
        assert_eq!(manifest.to_pretty_json().unwrap(), expected);
    }

    #[test]
    fn test_pretty_json_omits_absent_fields() {
        let json = Manifest::default().to_pretty_json().unwrap();
        assert_eq!(json, "{\n    \"files\": {}\n}");
    }

    #[test]
    fn test_load_document_missing_is_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let value = load_document(&dir.path().join("config.json")).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn test_load_document_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, SyncError::ConfigCorrupt { .. }));
    }

    #[test]
    fn test_write_atomic_replaces_content_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, "new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!dir.path().join("config.json.tmp").exists());
    }

    #[test]
    fn test_write_atomic_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file.
        let path = dir.path().join("config.json");
        fs::create_dir_all(path.join("occupied")).unwrap();

        assert!(write_atomic(&path, "new").is_err());

        assert!(path.join("occupied").is_dir());
        assert!(!dir.path().join("config.json.tmp").exists());
    }
}
