//! Host configuration, persisted as TOML.
//!
//! ```toml
//! [search]
//! source_timeout_seconds = 15
//! default_max_results = 10
//!
//! [logging]
//! filter = "info,fixfinder_search=debug"
//! ```

use std::path::{Path, PathBuf};

use fixfinder_search::SearchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{FixFinderError, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "FIXFINDER_CONFIG";

/// Top-level host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixFinderConfig {
    /// Deep search engine settings.
    pub search: SearchConfig,
    /// Diagnostic logging settings.
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
        }
    }
}

impl FixFinderConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// carries invalid search settings.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| FixFinderError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| FixFinderError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Same as [`FixFinderConfig::from_file`] for an existing file.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            Ok(Self::default())
        }
    }

    /// Check the search settings.
    ///
    /// # Errors
    ///
    /// Returns the engine's config error for invalid search settings.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        Ok(())
    }

    /// Config path from [`CONFIG_PATH_ENV`] if set, else [`Self::default_config_path`].
    pub fn resolve_config_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .filter(|value| !value.is_empty())
            .map_or_else(Self::default_config_path, PathBuf::from)
    }

    /// Returns the default config file path: `~/.config/fixfinder/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("fixfinder").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("fixfinder")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/fixfinder-config/config.toml")
        }
    }
}
