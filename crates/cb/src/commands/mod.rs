//! CLI command implementations.

pub(crate) mod build;
mod project;
pub(crate) mod serve;

pub(crate) use build::BuildArgs;
pub(crate) use serve::ServeArgs;
