//! Manifest API endpoint.
//!
//! Returns the PyScript manifest as currently written on disk.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// Handle GET /api/manifest.
///
/// Reading waits on the synchronizer lock, which a running refresh holds
/// while the packer runs, so it happens off the async workers.
pub(crate) async fn get_manifest(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let toolchain = Arc::clone(&state.toolchain);
    let manifest = tokio::task::spawn_blocking(move || toolchain.synchronizer().current()).await??;
    Ok(Json(manifest))
}
