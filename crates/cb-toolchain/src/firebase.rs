//! Firebase configuration copy.

use std::fs;
use std::io;

use cb_config::ProjectLayout;

/// Copy `src/firebase.json` to `public/firebase-configuration.json`.
///
/// Returns false without touching anything if the source file does not exist.
///
/// # Errors
///
/// Returns an I/O error if the copy fails.
pub fn copy_firebase(layout: &ProjectLayout) -> io::Result<bool> {
    let source = layout.firebase_source();
    if !source.is_file() {
        return Ok(false);
    }

    let destination = layout.firebase_destination();
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(&source, &destination)?;

    tracing::info!(destination = %destination.display(), "Copied Firebase configuration");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_firebase_absent_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());

        assert!(!copy_firebase(&layout).unwrap());
        assert!(!layout.firebase_destination().exists());
    }

    #[test]
    fn test_copy_firebase_copies_content() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(layout.firebase_source(), r#"{"apiKey":"k"}"#).unwrap();

        assert!(copy_firebase(&layout).unwrap());
        assert_eq!(
            fs::read_to_string(layout.firebase_destination()).unwrap(),
            r#"{"apiKey":"k"}"#
        );
    }
}
