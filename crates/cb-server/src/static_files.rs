//! Static file serving.
//!
//! Serves the project's `public/` directory, including the linked framework
//! assets, with `index.html` as fallback for client-side routes.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::state::AppState;

/// Create router serving `public_dir`.
pub(crate) fn static_router(public_dir: &Path) -> Router<Arc<AppState>> {
    let index = public_dir.join("index.html");
    let serve_dir = ServeDir::new(public_dir).not_found_service(ServeFile::new(index));

    Router::new().fallback_service(serve_dir)
}
