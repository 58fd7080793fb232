//! Symbolic links from the public tree into the installed `code-battles` package.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cb_config::ProjectLayout;

/// Error returned by the asset linker.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// The link source is missing, usually because dependencies are not installed.
    #[error("{} does not exist, run `npm install` first", .0.display())]
    SourceMissing(PathBuf),

    /// Creating the link or its ignore file failed.
    #[error("Failed to link {}: {source}", target.display())]
    Io {
        target: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Make `target` a directory symlink to `source` and keep it out of version control.
///
/// Returns true if the link was created by this call. An existing `target`
/// (link or real directory) is left as is. In both cases a `.gitignore`
/// ignoring everything is written inside `target`.
///
/// # Errors
///
/// Returns [`LinkError::SourceMissing`] if a new link would dangle.
pub fn ensure_link(target: &Path, source: &Path) -> Result<bool, LinkError> {
    let io_error = |source| LinkError::Io {
        target: target.to_path_buf(),
        source,
    };

    // symlink_metadata also sees dangling links, which exists() does not
    let created = if target.symlink_metadata().is_ok() {
        false
    } else {
        if !source.is_dir() {
            return Err(LinkError::SourceMissing(source.to_path_buf()));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        symlink_dir(source, target).map_err(io_error)?;
        tracing::info!(target = %target.display(), source = %source.display(), "Created symbolic link");
        true
    };

    fs::write(target.join(".gitignore"), "*").map_err(io_error)?;
    Ok(created)
}

/// Link the framework package and the PyScript runtime into `public/`.
///
/// Returns true if at least one link was newly created.
///
/// # Errors
///
/// Returns the first [`LinkError`] encountered.
pub fn link_assets(layout: &ProjectLayout) -> Result<bool, LinkError> {
    let mut created = false;
    for (target, source) in layout.asset_links() {
        created |= ensure_link(&target, &source)?;
    }
    Ok(created)
}

#[cfg(unix)]
fn symlink_dir(source: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn symlink_dir(source: &Path, target: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(source, target)
}
