//! API documentation generation via `pdoc`.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::PathBuf;

use cb_config::{DocumentationConfig, ProjectLayout};

use crate::tool::{ExternalTool, ToolError};

const INSTALL_HINT: &str = "pip install --upgrade pdoc";

/// Renders the competitor API reference from `public/scripts/api.py` into `public/`.
#[derive(Debug, Clone)]
pub struct DocsBuilder {
    tool: ExternalTool,
    scripts_dir: PathBuf,
    entry: PathBuf,
    template_dir: PathBuf,
    leftovers: [PathBuf; 2],
    options: DocumentationConfig,
}

impl DocsBuilder {
    pub fn new(layout: &ProjectLayout, options: DocumentationConfig) -> Self {
        Self {
            tool: ExternalTool::new("pdoc", INSTALL_HINT),
            scripts_dir: layout.scripts_dir(),
            entry: layout.api_entry_path(),
            template_dir: layout.docs_template_dir(),
            leftovers: layout.docs_leftovers(),
            options,
        }
    }

    /// Use a different documentation generator executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.tool = ExternalTool::new(program, INSTALL_HINT);
        self
    }

    /// Arguments passed to the generator, relative to the scripts directory.
    pub fn arguments(&self) -> Vec<OsString> {
        let entry = self
            .entry
            .strip_prefix(&self.scripts_dir)
            .unwrap_or(&self.entry);
        let mut args: Vec<OsString> = vec![
            entry.into(),
            "--no-show-source".into(),
            "-t".into(),
            self.template_dir.clone().into(),
        ];

        if let Some(footer) = self.options.footer_text.as_deref()
            && !footer.is_empty()
        {
            args.push("--footer-text".into());
            args.push(footer.into());
        }
        args.push("--favicon".into());
        args.push(self.options.favicon.as_str().into());
        args.push("--logo".into());
        args.push(self.options.logo.as_str().into());
        args.push("--logo-link".into());
        args.push(self.options.logo_link.as_str().into());
        args.push("-o".into());
        args.push("..".into());

        args
    }

    /// Run the generator, then delete the index page and search index it
    /// writes next to the site's own files.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] if the generator fails or its leftovers cannot
    /// be removed.
    pub fn build(&self) -> Result<(), ToolError> {
        self.tool.run(&self.scripts_dir, &self.arguments())?;

        for leftover in &self.leftovers {
            match fs::remove_file(leftover) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(ToolError::Io {
                        program: self.tool.program().to_owned(),
                        source,
                    });
                }
            }
        }

        tracing::info!(dir = %self.scripts_dir.display(), "Built API documentation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args_as_strings(builder: &DocsBuilder) -> Vec<String> {
        builder
            .arguments()
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn test_default_arguments() {
        let layout = ProjectLayout::new("/site");
        let builder = DocsBuilder::new(&layout, DocumentationConfig::default());

        assert_eq!(
            args_as_strings(&builder),
            vec![
                "api.py",
                "--no-show-source",
                "-t",
                "/site/node_modules/code-battles/dist/pdoc-template",
                "--favicon",
                "/images/logo.png",
                "--logo",
                "/images/logo-transparent.png",
                "--logo-link",
                "/",
                "-o",
                "..",
            ]
        );
    }

    #[test]
    fn test_footer_text_is_passed_verbatim() {
        let layout = ProjectLayout::new("/site");
        let options = DocumentationConfig {
            footer_text: Some("Made with \"love\"".to_owned()),
            ..DocumentationConfig::default()
        };
        let args = args_as_strings(&DocsBuilder::new(&layout, options));

        let index = args.iter().position(|a| a == "--footer-text").unwrap();
        assert_eq!(args[index + 1], "Made with \"love\"");
    }

    #[test]
    fn test_empty_footer_text_is_omitted() {
        let layout = ProjectLayout::new("/site");
        let options = DocumentationConfig {
            footer_text: Some(String::new()),
            ..DocumentationConfig::default()
        };
        let args = args_as_strings(&DocsBuilder::new(&layout, options));

        assert!(!args.iter().any(|a| a == "--footer-text"));
    }

    #[test]
    fn test_missing_generator_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        fs::create_dir_all(layout.scripts_dir()).unwrap();

        let err = DocsBuilder::new(&layout, DocumentationConfig::default())
            .with_program("cb-test-no-such-pdoc")
            .build()
            .unwrap_err();

        assert!(matches!(err, ToolError::Missing { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_build_removes_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        fs::create_dir_all(layout.scripts_dir()).unwrap();
        for leftover in layout.docs_leftovers() {
            fs::write(leftover, "").unwrap();
        }
        fs::write(layout.public_dir().join("api.html"), "").unwrap();

        DocsBuilder::new(&layout, DocumentationConfig::default())
            .with_program("true")
            .build()
            .unwrap();

        assert!(!layout.public_dir().join("index.html").exists());
        assert!(!layout.public_dir().join("search.js").exists());
        assert!(layout.public_dir().join("api.html").exists());
    }
}
