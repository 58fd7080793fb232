//! Manifest synchronization errors.

use std::path::PathBuf;

/// Error returned by [`ManifestSynchronizer::synchronize`](crate::ManifestSynchronizer::synchronize).
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The existing manifest is not valid JSON. It is left untouched so that
    /// hand edits are not discarded.
    #[error("Manifest {} is corrupt: {source}", path.display())]
    ConfigCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The scanned directory does not exist.
    #[error("Scripts directory {} does not exist (were the code battles links created?)", .0.display())]
    ScanRootMissing(PathBuf),

    /// The existing manifest exists but could not be read.
    #[error("Failed to read manifest {}: {source}", path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The new manifest could not be written.
    #[error("Failed to write manifest {}: {source}", path.display())]
    PersistFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
