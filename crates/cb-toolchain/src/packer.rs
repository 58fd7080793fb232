//! Single-file packing of the competitor's Python project via `pybunch`.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::PathBuf;

use cb_config::{PACKED_FILENAME, ProjectLayout};

use crate::tool::{ExternalTool, ToolError};

/// Package whose entry point is packed.
const PACKAGE_NAME: &str = "code_battles";
/// Entry module inside the package.
const ENTRY_MODULE: &str = "main";

/// Packs every module reachable from `code_battles.main` into `packed.py`.
#[derive(Debug, Clone)]
pub struct Packer {
    tool: ExternalTool,
    scripts_dir: PathBuf,
    packed_path: PathBuf,
}

impl Packer {
    pub fn new(layout: &ProjectLayout) -> Self {
        Self {
            tool: ExternalTool::new("pybunch", "pip install --upgrade pybunch"),
            scripts_dir: layout.scripts_dir(),
            packed_path: layout.packed_path(),
        }
    }

    /// Use a different packer executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.tool = ExternalTool::new(program, "pip install --upgrade pybunch");
        self
    }

    /// Arguments passed to the packer, relative to the scripts directory.
    pub fn arguments() -> Vec<OsString> {
        ["-d", ".", "-p", PACKAGE_NAME, "-e", ENTRY_MODULE, "-o", PACKED_FILENAME]
            .into_iter()
            .map(OsString::from)
            .collect()
    }

    /// Remove the previous output and run the packer.
    ///
    /// The old artifact is deleted first so a failed run never leaves a
    /// stale bundle behind.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] if the old artifact cannot be removed or the
    /// packer fails.
    pub fn pack(&self) -> Result<(), ToolError> {
        match fs::remove_file(&self.packed_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ToolError::Io {
                    program: self.tool.program().to_owned(),
                    source,
                });
            }
        }

        self.tool.run(&self.scripts_dir, &Self::arguments())?;
        tracing::info!(path = %self.packed_path.display(), "Packed Python files");
        Ok(())
    }
}
