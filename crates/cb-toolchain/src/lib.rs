//! Project preparation steps for Code Battles sites.
//!
//! This crate wires the manifest synchronizer together with the other steps a
//! site needs before it can be served:
//!
//! - Symbolic links from `public/` into the installed `code-battles` package
//! - API documentation rendered by `pdoc`
//! - A single-file bundle of the competitor's code produced by `pybunch`
//! - A copy of the Firebase configuration
//!
//! External tools are optional. When one is missing or fails, the pipeline
//! keeps going and reports the failure as a warning.

mod docs;
mod firebase;
mod linker;
mod packer;
mod pipeline;
mod tool;

pub use docs::DocsBuilder;
pub use firebase::copy_firebase;
pub use linker::{LinkError, ensure_link, link_assets};
pub use packer::Packer;
pub use pipeline::{PipelineError, Report, Toolchain};
pub use tool::{ExternalTool, ToolError};
