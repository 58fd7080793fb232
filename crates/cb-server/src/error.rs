//! Error types for the development server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cb_manifest::SyncError;
use serde_json::json;

/// Error that prevents the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Host and port do not form a socket address.
    #[error("Invalid listen address {0}")]
    Address(String),

    /// Binding or serving failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file watcher could not be started.
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),
}

/// Error returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    /// The manifest could not be read.
    #[error("{0}")]
    Manifest(#[from] SyncError),

    /// The blocking read was cancelled or panicked.
    #[error("Manifest read failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Manifest(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({"error": self.to_string()});

        (status, axum::Json(body)).into_response()
    }
}
