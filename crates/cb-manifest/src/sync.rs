//! Manifest synchronization against the scripts directory.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use serde_json::Value;

use crate::SyncError;
use crate::manifest::{Manifest, ManifestOptions, load_document, write_atomic};
use crate::scanner::SourceScanner;

/// Result of a synchronization pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The manifest content changed and was written.
    Updated,
    /// The manifest already matched; nothing was written.
    Unchanged,
}

impl SyncOutcome {
    /// Returns true if the manifest file was rewritten.
    pub fn is_updated(self) -> bool {
        self == Self::Updated
    }
}

/// Keeps a manifest file in sync with the sources below a directory.
///
/// Each pass reads the current manifest, rebuilds a candidate from the
/// filesystem, and writes it only if the two differ. Passes are serialized
/// by an internal lock, so concurrent callers never interleave their
/// read-compare-write sequences.
pub struct ManifestSynchronizer {
    scanner: SourceScanner,
    manifest_path: PathBuf,
    lock: Mutex<()>,
}

impl ManifestSynchronizer {
    /// Create a synchronizer scanning `scripts_dir` and writing `manifest_path`.
    pub fn new(scripts_dir: impl Into<PathBuf>, manifest_path: impl Into<PathBuf>) -> Self {
        Self::with_scanner(SourceScanner::new(scripts_dir), manifest_path)
    }

    /// Create a synchronizer with a preconfigured scanner.
    pub fn with_scanner(scanner: SourceScanner, manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            scanner,
            manifest_path: manifest_path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Check whether a watcher-reported path should trigger a new pass.
    pub fn is_tracked(&self, path: &Path) -> bool {
        self.scanner.is_tracked(path)
    }

    /// Check whether a watcher-reported directory may add or remove sources.
    pub fn is_tracked_dir(&self, path: &Path) -> bool {
        self.scanner.is_tracked_dir(path)
    }

    /// Bring the manifest in line with the sources on disk.
    ///
    /// The candidate manifest is built from scratch: options that are `None`
    /// are absent from the result even if the previous manifest had them.
    ///
    /// # Errors
    ///
    /// - [`SyncError::ConfigCorrupt`] if the existing manifest is not valid JSON
    /// - [`SyncError::ScanRootMissing`] if the scripts directory is missing
    /// - [`SyncError::PersistFailure`] if the new manifest cannot be written
    pub fn synchronize(&self, options: &ManifestOptions) -> Result<SyncOutcome, SyncError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let start = Instant::now();

        let original = load_document(&self.manifest_path)?;
        let sources = self.scanner.scan()?;
        let candidate = Manifest::build(sources.iter().map(String::as_str), options);

        let persist_error = |source: std::io::Error| SyncError::PersistFailure {
            path: self.manifest_path.clone(),
            source,
        };

        let candidate_value =
            serde_json::to_value(&candidate).map_err(|e| persist_error(e.into()))?;
        if candidate_value == original {
            tracing::debug!(
                path = %self.manifest_path.display(),
                files = candidate.files.len(),
                "Manifest unchanged"
            );
            return Ok(SyncOutcome::Unchanged);
        }

        let content = candidate
            .to_pretty_json()
            .map_err(|e| persist_error(e.into()))?;
        write_atomic(&self.manifest_path, &content).map_err(persist_error)?;

        tracing::info!(
            path = %self.manifest_path.display(),
            files = candidate.files.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Manifest updated"
        );
        Ok(SyncOutcome::Updated)
    }

    /// Read the manifest currently on disk as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ConfigCorrupt`] if the file is not valid JSON.
    pub fn current(&self) -> Result<Value, SyncError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        load_document(&self.manifest_path)
    }
}
