//! `cb serve` command implementation.

use std::sync::Arc;

use cb_config::CliSettings;
use cb_server::{run_server, server_config_from_config};
use cb_toolchain::Toolchain;
use clap::Args;

use super::project::{self, ProjectArgs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable live reload (default: enabled).
    #[arg(long)]
    live_reload: Option<bool>,

    /// Disable live reload.
    #[arg(long, conflicts_with = "live_reload")]
    no_live_reload: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the initial build fails, or
    /// the server fails to start.
    pub(crate) async fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            host: self.host.clone(),
            port: self.port,
            root: None,
            live_reload_enabled: self.resolve_live_reload_enabled(),
        };
        let config = self.project.load(cli_settings)?;

        let toolchain = Arc::new(Toolchain::from_config(&config));
        let build_toolchain = Arc::clone(&toolchain);
        let report = tokio::task::spawn_blocking(move || build_toolchain.build())
            .await??;
        project::report(output, &report);
        if report.links_created {
            output.info("New symbolic links were created; they are served right away");
        }

        output.info(&format!(
            "Starting server on http://{}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Project root: {}",
            config.layout().root.display()
        ));
        if config.live_reload.enabled {
            output.info("Live reload: enabled");
        } else {
            output.info("Live reload: disabled");
        }

        run_server(server_config_from_config(&config), toolchain).await?;

        Ok(())
    }

    /// Resolve `live_reload_enabled` from --live-reload/--no-live-reload flags.
    fn resolve_live_reload_enabled(&self) -> Option<bool> {
        self.no_live_reload.then_some(false).or(self.live_reload)
    }
}
