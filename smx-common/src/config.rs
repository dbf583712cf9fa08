//! Configuration loading
//!
//! Config file resolution priority:
//! 1. Explicit path (command-line argument)
//! 2. `SMX_CONFIG` environment variable
//! 3. Platform config file (`<config dir>/smx/config.toml`)
//! 4. Compiled defaults
//!
//! An explicitly named file must load. A platform file that is missing or
//! broken only produces a warning.

use crate::field::FieldCatalog;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "SMX_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmxConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub folders: FolderConfig,

    #[serde(default)]
    pub fields: FieldsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Companion file discovery settings
#[derive(Debug, Clone, Deserialize)]
pub struct FolderConfig {
    /// Files ending in these are never companions (sidecars, test fixtures)
    #[serde(default = "default_excluded_suffixes")]
    pub excluded_suffixes: Vec<String>,

    /// File names containing any of these are skipped
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldsConfig {
    /// JSON field catalog replacing the built-in one
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_excluded_suffixes() -> Vec<String> {
    vec![".meta".to_string(), ".test".to_string()]
}

fn default_ignore_patterns() -> Vec<String> {
    vec![".DS_Store".to_string(), "Thumbs.db".to_string()]
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            excluded_suffixes: default_excluded_suffixes(),
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

impl SmxConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load following the resolution priority in the module docs
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_path {
            return Self::load_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load_file(Path::new(&path));
        }

        if let Some(path) = platform_config_path() {
            if path.exists() {
                match Self::load_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), "Ignoring config file: {}", e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Configured field catalog, or the built-in one
    pub fn field_catalog(&self) -> Result<FieldCatalog> {
        match &self.fields.catalog {
            Some(path) => FieldCatalog::load(path),
            None => FieldCatalog::builtin(),
        }
    }
}

/// `<config dir>/smx/config.toml` for the current platform
pub fn platform_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("smx").join("config.toml"))
}
