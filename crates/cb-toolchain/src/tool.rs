//! Invocation of external command-line tools.
//!
//! Tools are best-effort: every failure is reported as a [`ToolError`] that
//! callers log and move past.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::Instant;

/// Error returned when an external tool could not do its job.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The program is not on `PATH`.
    #[error("{program} was not found, install it with `{install_hint}`")]
    Missing {
        program: String,
        install_hint: &'static str,
    },

    /// The program ran and exited unsuccessfully.
    #[error("{program} failed ({status}): {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The working directory for the program does not exist.
    #[error("Cannot run {program}: directory {} does not exist", dir.display())]
    WorkingDirMissing { program: String, dir: PathBuf },

    /// Filesystem work around the invocation failed.
    #[error("I/O error around {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// An external program with a hint on how to install it.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    program: String,
    install_hint: &'static str,
}

impl ExternalTool {
    pub fn new(program: impl Into<String>, install_hint: &'static str) -> Self {
        Self {
            program: program.into(),
            install_hint,
        }
    }

    /// Program name or path.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the program in `cwd` and wait for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Missing`] if the program cannot be found and
    /// [`ToolError::Failed`] if it exits with a non-zero status.
    pub fn run(&self, cwd: &Path, args: &[OsString]) -> Result<(), ToolError> {
        if !cwd.is_dir() {
            return Err(ToolError::WorkingDirMissing {
                program: self.program.clone(),
                dir: cwd.to_path_buf(),
            });
        }

        let start = Instant::now();
        tracing::debug!(program = %self.program, ?args, cwd = %cwd.display(), "Running tool");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|e| self.io_error(e))?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        tracing::info!(
            program = %self.program,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Tool finished"
        );
        Ok(())
    }

    /// Wrap an I/O error, recognizing a missing executable.
    pub(crate) fn io_error(&self, source: io::Error) -> ToolError {
        if source.kind() == io::ErrorKind::NotFound {
            ToolError::Missing {
                program: self.program.clone(),
                install_hint: self.install_hint,
            }
        } else {
            ToolError::Io {
                program: self.program.clone(),
                source,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ExternalTool::new("cb-test-no-such-program", "pip install nothing");

        let err = tool.run(dir.path(), &[]).unwrap_err();

        assert!(matches!(err, ToolError::Missing { .. }));
        assert!(err.to_string().contains("pip install nothing"));
    }

    #[test]
    fn test_missing_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ExternalTool::new("cb-test-no-such-program", "");

        let err = tool.run(&dir.path().join("missing"), &[]).unwrap_err();

        assert!(matches!(err, ToolError::WorkingDirMissing { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ExternalTool::new("false", "");

        let err = tool.run(dir.path(), &[]).unwrap_err();

        assert!(matches!(err, ToolError::Failed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_program_runs_in_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ExternalTool::new("touch", "");

        tool.run(dir.path(), &["marker".into()]).unwrap();

        assert!(dir.path().join("marker").exists());
    }
}
