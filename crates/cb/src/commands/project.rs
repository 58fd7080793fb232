//! Options and reporting shared by every command.

use std::path::PathBuf;

use cb_config::{CliSettings, Config, ProjectLayout};
use cb_manifest::SyncOutcome;
use cb_toolchain::Report;
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments locating the project.
#[derive(Args)]
pub(crate) struct ProjectArgs {
    /// Path to configuration file (default: auto-discover codebattles.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project root directory (overrides config).
    #[arg(short, long, env = "CODE_BATTLES_ROOT")]
    root: Option<PathBuf>,

    /// Enable verbose output (show tool invocations and timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ProjectArgs {
    /// Load configuration, applying `settings` on top of the file.
    ///
    /// The project root is canonicalized so that paths reported by the file
    /// watcher can be compared against it.
    pub(crate) fn load(&self, mut settings: CliSettings) -> Result<Config, CliError> {
        settings.root.clone_from(&self.root);

        let mut config = Config::load(self.config.as_deref(), Some(&settings))?;
        config.validate()?;

        let root = &config.layout().root;
        let canonical = root.canonicalize().map_err(|e| {
            CliError::Validation(format!(
                "Project root {} is not accessible: {e}",
                root.display()
            ))
        })?;
        config.project_resolved.layout = ProjectLayout::new(canonical);

        tracing::debug!(
            root = %config.layout().root.display(),
            config_file = ?config.config_path,
            "Loaded configuration"
        );
        Ok(config)
    }
}

/// Print what a pipeline run did.
pub(crate) fn report(output: &Output, report: &Report) {
    if report.links_created {
        output.success("Created code battles symbolic links");
    }
    if report.docs_built {
        output.success("Created API documentation");
    }
    if report.packed {
        output.success("Packed all Python files");
    }
    if report.manifest == SyncOutcome::Updated {
        output.success("Created PyScript configuration file");
    }
    if report.firebase_copied {
        output.success("Copied Firebase configuration");
    }
    for warning in &report.warnings {
        output.warning(&warning.to_string());
    }
}
