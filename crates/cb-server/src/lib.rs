//! Development server for Code Battles sites.
//!
//! Serves the project's `public/` directory and keeps the PyScript manifest
//! in sync with the Python sources while it runs:
//! - `/api/manifest` returns the manifest as written on disk
//! - `/ws/live-reload` pushes `{"type":"full-reload"}` after a source change
//! - everything else is a static file, with `index.html` as fallback
//!
//! ```text
//! Browser ──HTTP──► axum server (cb-server)
//!                        │
//!                        ├─► /api/manifest ──► ManifestSynchronizer::current
//!                        │
//!                        ├─► WebSocket ◄── LiveReloadManager
//!                        │                     │
//!                        │                     └─► notify ──► Toolchain::refresh
//!                        │
//!                        └─► Static files (tower-http ServeDir)
//! ```

mod app;
mod error;
mod handlers;
mod live_reload;
mod middleware;
mod state;
mod static_files;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use cb_toolchain::Toolchain;
use state::AppState;
use tokio::sync::broadcast;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory served as the site root.
    pub public_dir: PathBuf,
    /// Watch sources and push reload events.
    pub live_reload_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 5173,
            public_dir: PathBuf::from("public"),
            live_reload_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Address`] if host and port do not parse.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let address = format!("{}:{}", self.host, self.port);
        address.parse().map_err(|_| ServerError::Address(address))
    }
}

/// Run the server until Ctrl-C.
///
/// The project is expected to be built already; the server only refreshes it
/// when sources change.
///
/// # Errors
///
/// Returns an error if the watcher cannot start or the address cannot be bound.
pub async fn run_server(config: ServerConfig, toolchain: Arc<Toolchain>) -> Result<(), ServerError> {
    let addr = config.socket_addr()?;

    let live_reload = if config.live_reload_enabled {
        let (tx, _rx) = broadcast::channel::<live_reload::ReloadEvent>(100);
        let mut manager = live_reload::LiveReloadManager::new(Arc::clone(&toolchain), tx);
        manager.start()?;
        Some(manager)
    } else {
        None
    };

    let state = Arc::new(AppState {
        toolchain,
        live_reload,
    });
    let app = app::create_router(state, &config.public_dir);

    tracing::info!(address = %addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from loaded configuration.
#[must_use]
pub fn server_config_from_config(config: &cb_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        public_dir: config.layout().public_dir(),
        live_reload_enabled: config.live_reload.enabled,
    }
}
