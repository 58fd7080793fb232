//! `cb build` command implementation.

use cb_config::CliSettings;
use cb_toolchain::Toolchain;
use clap::Args;

use super::project::{self, ProjectArgs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the framework assets cannot
    /// be linked, or the manifest cannot be synchronized.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let config = self.project.load(CliSettings::default())?;
        output.info(&format!(
            "Project root: {}",
            config.layout().root.display()
        ));

        let report = Toolchain::from_config(&config).build()?;
        project::report(output, &report);

        Ok(())
    }
}
