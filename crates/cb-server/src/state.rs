//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use cb_toolchain::Toolchain;

use crate::live_reload::LiveReloadManager;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Project preparation steps, including the manifest synchronizer.
    pub(crate) toolchain: Arc<Toolchain>,
    /// Live reload manager (if enabled).
    pub(crate) live_reload: Option<LiveReloadManager>,
}

impl AppState {
    /// Check if live reload is enabled.
    #[must_use]
    pub(crate) fn live_reload_enabled(&self) -> bool {
        self.live_reload.is_some()
    }
}
