//! PyScript manifest synchronization.
//!
//! Keeps `public/config.json` in sync with the Python sources under
//! `public/scripts`, so the in-browser interpreter can fetch every module of
//! the competitor's project.
//!
//! The manifest is rebuilt from scratch on every pass and compared with the
//! document on disk; the file is only rewritten when the content differs.
//! Repeated passes over an unchanged tree are therefore free of writes, which
//! keeps file watchers from triggering spurious reloads.
//!
//! # Example
//!
//! ```ignore
//! use cb_manifest::{ManifestOptions, ManifestSynchronizer, SyncOutcome};
//!
//! let sync = ManifestSynchronizer::new("public/scripts", "public/config.json");
//! match sync.synchronize(&ManifestOptions::default())? {
//!     SyncOutcome::Updated => println!("manifest updated"),
//!     SyncOutcome::Unchanged => {}
//! }
//! ```

mod error;
mod manifest;
mod scanner;
mod sync;

pub use error::SyncError;
pub use manifest::{Manifest, ManifestOptions, URL_PREFIX};
pub use scanner::{CACHE_DIR, SourceScanner};
pub use sync::{ManifestSynchronizer, SyncOutcome};
