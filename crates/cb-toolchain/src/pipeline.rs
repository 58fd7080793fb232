//! Build and refresh pipelines.
//!
//! A full build links the framework assets, renders the API documentation,
//! packs the Python sources, synchronizes the manifest and copies the
//! Firebase configuration. A refresh (run on every source change) only packs
//! and synchronizes.

use std::io;

use cb_config::{Config, DocumentationConfig, PACKED_FILENAME, ProjectLayout};
use cb_manifest::{ManifestOptions, ManifestSynchronizer, SourceScanner, SyncError, SyncOutcome};

use crate::docs::DocsBuilder;
use crate::firebase::copy_firebase;
use crate::linker::{LinkError, link_assets};
use crate::packer::Packer;
use crate::tool::ToolError;

/// Error that stops a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    Link(#[from] LinkError),

    #[error("{0}")]
    Sync(#[from] SyncError),

    #[error("Failed to copy Firebase configuration: {0}")]
    Firebase(#[source] io::Error),
}

/// What a pipeline run did.
///
/// Tool failures do not stop the pipeline; they are collected in `warnings`
/// for the caller to report.
#[derive(Debug)]
pub struct Report {
    /// At least one asset link was created during this run.
    pub links_created: bool,
    /// Whether the API documentation was rendered.
    pub docs_built: bool,
    /// Whether the packer produced a fresh artifact.
    pub packed: bool,
    /// Whether the manifest was rewritten.
    pub manifest: SyncOutcome,
    /// Whether the Firebase configuration was copied.
    pub firebase_copied: bool,
    /// Best-effort steps that failed.
    pub warnings: Vec<ToolError>,
}

impl Report {
    fn new(manifest: SyncOutcome) -> Self {
        Self {
            links_created: false,
            docs_built: false,
            packed: false,
            manifest,
            firebase_copied: false,
            warnings: Vec::new(),
        }
    }
}

/// All project preparation steps, wired to one project layout.
pub struct Toolchain {
    layout: ProjectLayout,
    options: ManifestOptions,
    synchronizer: ManifestSynchronizer,
    packer: Packer,
    docs: DocsBuilder,
}

impl Toolchain {
    pub fn new(
        layout: ProjectLayout,
        options: ManifestOptions,
        documentation: DocumentationConfig,
        include_stubs: bool,
    ) -> Self {
        let scanner = SourceScanner::new(layout.scripts_dir())
            .with_stubs(include_stubs)
            .with_artifact(PACKED_FILENAME);
        let synchronizer = ManifestSynchronizer::with_scanner(scanner, layout.manifest_path());
        let packer = Packer::new(&layout);
        let docs = DocsBuilder::new(&layout, documentation);

        Self {
            layout,
            options,
            synchronizer,
            packer,
            docs,
        }
    }

    /// Create a toolchain from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        let options = ManifestOptions {
            packages: config.pyscript.packages.clone(),
            interpreter: config.pyscript.interpreter.clone(),
        };
        Self::new(
            config.layout().clone(),
            options,
            config.documentation.clone(),
            config.project_resolved.include_stubs,
        )
    }

    /// Replace the packer executable.
    #[must_use]
    pub fn with_packer_program(mut self, program: impl Into<String>) -> Self {
        self.packer = self.packer.with_program(program);
        self
    }

    /// Replace the documentation generator executable.
    #[must_use]
    pub fn with_docs_program(mut self, program: impl Into<String>) -> Self {
        self.docs = self.docs.with_program(program);
        self
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn synchronizer(&self) -> &ManifestSynchronizer {
        &self.synchronizer
    }

    /// Run every preparation step, in order.
    ///
    /// # Errors
    ///
    /// Fails if the asset links cannot be created, the manifest cannot be
    /// synchronized, or the Firebase configuration cannot be copied. Tool
    /// failures are reported in [`Report::warnings`] instead.
    pub fn build(&self) -> Result<Report, PipelineError> {
        let links_created = link_assets(&self.layout)?;

        let mut warnings = Vec::new();
        let docs_result = self.docs.build();
        let docs_built = docs_result.is_ok();
        if let Err(e) = docs_result {
            tracing::warn!(error = %e, "Failed building API documentation");
            warnings.push(e);
        }

        let mut report = self.refresh()?;
        report.links_created = links_created;
        report.docs_built = docs_built;
        warnings.append(&mut report.warnings);
        report.warnings = warnings;

        report.firebase_copied = copy_firebase(&self.layout).map_err(PipelineError::Firebase)?;

        Ok(report)
    }

    /// Pack the sources and synchronize the manifest.
    ///
    /// # Errors
    ///
    /// Fails only if synchronization fails; a packer failure is reported in
    /// [`Report::warnings`].
    pub fn refresh(&self) -> Result<Report, PipelineError> {
        let pack_result = self.packer.pack();
        let manifest = self.synchronizer.synchronize(&self.options)?;

        let mut report = Report::new(manifest);
        report.packed = pack_result.is_ok();
        if let Err(e) = pack_result {
            tracing::warn!(error = %e, "Failed packing the Python files");
            report.warnings.push(e);
        }
        Ok(report)
    }
}
