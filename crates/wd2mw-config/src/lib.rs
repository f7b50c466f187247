//! Configuration loading for wd2mw.
//!
//! Parses `wd2mw.toml` with serde. Without an explicit path the file is
//! searched for in the current directory and its parents; if none is found,
//! defaults relative to the current directory are used.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! These string values support `${VAR}` and `${VAR:-default}`:
//! - `convert.source_dir`
//! - `convert.output_dir`
//! - `mediawiki.endpoint`
//! - `mediawiki.bot_username`
//! - `mediawiki.bot_password`
//!
//! ## Example
//!
//! ```toml
//! [convert]
//! source_dir = "backup"
//! ignore_extension = "tmp"
//! replacements = [{ from = "[[module Rate]]", to = "" }]
//!
//! [mediawiki]
//! endpoint = "https://wiki.example.com/api.php"
//! bot_username = "Admin@migration"
//! bot_password = "${WIKI_BOT_PASSWORD}"
//! ```

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the Wikidot backup directory.
    pub source_dir: Option<PathBuf>,
    /// Override the output directory.
    pub output_dir: Option<PathBuf>,
    /// Override the MediaWiki API endpoint.
    pub endpoint: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "wd2mw.toml";

const DEFAULT_SOURCE_DIR: &str = "wikidot";
const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_INDEX_TITLE: &str = "Wikidot index";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Conversion settings (paths are relative strings from TOML).
    convert: ConvertConfigRaw,
    /// MediaWiki connection settings, needed only for uploads.
    pub mediawiki: Option<MediaWikiConfig>,

    /// Resolved conversion settings (set after loading).
    #[serde(skip)]
    pub convert_resolved: ConvertConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw conversion settings as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConvertConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    ignore_extension: Option<String>,
    index_title: Option<String>,
    replacements: Vec<Replacement>,
}

/// Literal text substitution applied to every page before conversion.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Replacement {
    /// Text to search for.
    pub from: String,
    /// Replacement text.
    pub to: String,
}

/// Resolved conversion settings with absolute paths.
#[derive(Debug)]
pub struct ConvertConfig {
    /// Wikidot backup directory (contains `source/`, `meta/` and `files/`).
    pub source_dir: PathBuf,
    /// Directory receiving converted pages and staged files.
    pub output_dir: PathBuf,
    /// Extension, without the dot, of associated files the cross-check skips.
    pub ignore_extension: Option<String>,
    /// Title of the generated index page.
    pub index_title: String,
    /// Literal replacements, in application order.
    pub replacements: Vec<Replacement>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            ignore_extension: None,
            index_title: DEFAULT_INDEX_TITLE.to_owned(),
            replacements: Vec::new(),
        }
    }
}

/// MediaWiki connection settings.
#[derive(Debug, Deserialize)]
pub struct MediaWikiConfig {
    /// Action API endpoint, e.g. `https://wiki.example.com/api.php`.
    pub endpoint: String,
    /// Bot username as created on `Special:BotPasswords`.
    #[serde(default)]
    pub bot_username: String,
    /// Bot password.
    #[serde(default)]
    pub bot_password: String,
    /// Whether to verify the server's TLS certificate.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

impl MediaWikiConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or the endpoint
    /// is not an http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.endpoint, "mediawiki.endpoint")?;
        require_http_url(&self.endpoint, "mediawiki.endpoint")?;
        require_non_empty(&self.bot_username, "mediawiki.bot_username")?;
        require_non_empty(&self.bot_password, "mediawiki.bot_password")?;
        Ok(())
    }
}

fn default_verify_tls() -> bool {
    true
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
        /// Config field path (e.g., "`mediawiki.bot_password`").
        field: String,
        /// Error message (e.g., "${`WIKI_BOT_PASSWORD`} not set").
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

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `wd2mw.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution.
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
        if let Some(source_dir) = &settings.source_dir {
            self.convert_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.convert_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(endpoint) = &settings.endpoint {
            match &mut self.mediawiki {
                Some(mediawiki) => mediawiki.endpoint.clone_from(endpoint),
                None => {
                    self.mediawiki = Some(MediaWikiConfig {
                        endpoint: endpoint.clone(),
                        bot_username: String::new(),
                        bot_password: String::new(),
                        verify_tls: default_verify_tls(),
                    });
                }
            }
        }
    }

    /// Get validated MediaWiki configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_mediawiki(&self) -> Result<&MediaWikiConfig, ConfigError> {
        let mediawiki = self.mediawiki.as_ref().ok_or_else(|| {
            ConfigError::Validation("[mediawiki] section required in config".into())
        })?;
        mediawiki.validate()?;
        Ok(mediawiki)
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
            convert: ConvertConfigRaw::default(),
            mediawiki: None,
            convert_resolved: ConvertConfig {
                source_dir: base.join(DEFAULT_SOURCE_DIR),
                output_dir: base.join(DEFAULT_OUTPUT_DIR),
                ..ConvertConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// The `[mediawiki]` section is not checked here; commands that upload
    /// call [`Config::require_mediawiki`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let convert = &self.convert_resolved;
        require_non_empty(&convert.index_title, "convert.index_title")?;

        if let Some(ext) = &convert.ignore_extension {
            require_non_empty(ext, "convert.ignore_extension")?;
        }

        if convert.replacements.iter().any(|r| r.from.is_empty()) {
            return Err(ConfigError::Validation(
                "convert.replacements entries need a non-empty `from`".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.convert.source_dir {
            self.convert.source_dir = Some(expand::expand_env(dir, "convert.source_dir")?);
        }
        if let Some(ref dir) = self.convert.output_dir {
            self.convert.output_dir = Some(expand::expand_env(dir, "convert.output_dir")?);
        }

        if let Some(ref mut mediawiki) = self.mediawiki {
            mediawiki.endpoint = expand::expand_env(&mediawiki.endpoint, "mediawiki.endpoint")?;
            mediawiki.bot_username =
                expand::expand_env(&mediawiki.bot_username, "mediawiki.bot_username")?;
            mediawiki.bot_password =
                expand::expand_env(&mediawiki.bot_password, "mediawiki.bot_password")?;
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));
        let raw = &self.convert;

        self.convert_resolved = ConvertConfig {
            source_dir: resolve(raw.source_dir.as_deref(), DEFAULT_SOURCE_DIR),
            output_dir: resolve(raw.output_dir.as_deref(), DEFAULT_OUTPUT_DIR),
            ignore_extension: raw
                .ignore_extension
                .as_deref()
                .map(|ext| ext.trim_start_matches('.').to_owned()),
            index_title: raw
                .index_title
                .clone()
                .unwrap_or_else(|| DEFAULT_INDEX_TITLE.to_owned()),
            replacements: raw.replacements.clone(),
        };
    }
}
