//! Configuration management for the Code Battles toolchain.
//!
//! Parses `codebattles.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion
//! (`${VAR}` expands to the value of VAR, errors if unset).
//!
//! Expanded fields:
//! - `server.host`
//! - `documentation.favicon`
//! - `documentation.logo`
//! - `documentation.logo_link`
//! - `documentation.footer_text`

mod expand;
mod layout;

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use layout::{PACKED_FILENAME, ProjectLayout};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override project root directory.
    pub root: Option<PathBuf>,
    /// Override live reload enabled flag.
    pub live_reload_enabled: Option<bool>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "codebattles.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Development server configuration.
    pub server: ServerConfig,
    /// Project configuration (paths are relative strings from TOML).
    project: ProjectConfigRaw,
    /// Options merged into the generated PyScript manifest.
    pub pyscript: PyScriptConfig,
    /// Display options for the generated API documentation.
    pub documentation: DocumentationConfig,
    /// Live reload configuration.
    pub live_reload: LiveReloadConfig,

    /// Resolved project configuration (set after loading).
    #[serde(skip)]
    pub project_resolved: ProjectConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 5173,
        }
    }
}

/// Raw project configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ProjectConfigRaw {
    root: Option<String>,
    include_stubs: Option<bool>,
}

/// Resolved project configuration with absolute paths.
#[derive(Debug)]
pub struct ProjectConfig {
    /// Fixed locations inside the project.
    pub layout: ProjectLayout,
    /// Whether `.pyi` stub files are listed in the manifest.
    pub include_stubs: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            layout: ProjectLayout::new("."),
            include_stubs: false,
        }
    }
}

/// Options merged into the generated PyScript manifest.
///
/// `None` means "omit the field", which is different from an empty list.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PyScriptConfig {
    /// Additional Python packages to install in the browser.
    pub packages: Option<Vec<String>>,
    /// Custom Pyodide interpreter version.
    pub interpreter: Option<String>,
}

/// Display options for the generated API documentation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentationConfig {
    /// URL of the favicon.
    pub favicon: String,
    /// URL of the sidebar logo.
    pub logo: String,
    /// Link target of the sidebar logo.
    pub logo_link: String,
    /// Optional footer text for the sidebar.
    pub footer_text: Option<String>,
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            favicon: "/images/logo.png".to_owned(),
            logo: "/images/logo-transparent.png".to_owned(),
            logo_link: "/".to_owned(),
            footer_text: None,
        }
    }
}

/// Live reload configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LiveReloadConfig {
    /// Whether live reload is enabled.
    pub enabled: bool,
}

impl Default for LiveReloadConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`CB_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `codebattles.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(root) = &settings.root {
            self.project_resolved.layout = ProjectLayout::new(root);
        }
        if let Some(live_reload_enabled) = settings.live_reload_enabled {
            self.live_reload.enabled = live_reload_enabled;
        }
    }

    /// Shortcut for the resolved project layout.
    #[must_use]
    pub fn layout(&self) -> &ProjectLayout {
        &self.project_resolved.layout
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            project: ProjectConfigRaw::default(),
            pyscript: PyScriptConfig::default(),
            documentation: DocumentationConfig::default(),
            live_reload: LiveReloadConfig::default(),
            project_resolved: ProjectConfig {
                layout: ProjectLayout::new(base),
                include_stubs: false,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        if let Some(packages) = &self.pyscript.packages
            && packages.iter().any(String::is_empty)
        {
            return Err(ConfigError::Validation(
                "pyscript.packages cannot contain empty names".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        let docs = &mut self.documentation;
        docs.favicon = expand::expand_env(&docs.favicon, "documentation.favicon")?;
        docs.logo = expand::expand_env(&docs.logo, "documentation.logo")?;
        docs.logo_link = expand::expand_env(&docs.logo_link, "documentation.logo_link")?;
        if let Some(ref footer) = docs.footer_text {
            docs.footer_text = Some(expand::expand_env(footer, "documentation.footer_text")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let root = self
            .project
            .root
            .as_deref()
            .map_or_else(|| config_dir.to_path_buf(), |r| config_dir.join(r));
        self.project_resolved = ProjectConfig {
            layout: ProjectLayout::new(root),
            include_stubs: self.project.include_stubs.unwrap_or(false),
        };
    }
}
