#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for tempshare
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/tempshare/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempshare_errors::{ConfigError, Error};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub temp: TempConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Temp-file factory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempConfig {
    /// Directory new temp files are created in (None = system temp dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_random_len")]
    pub random_len: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for TempConfig {
    fn default() -> Self {
        Self {
            dir: None,
            prefix: default_prefix(),
            random_len: default_random_len(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_prefix() -> String {
    constants::DEFAULT_PREFIX.to_string()
}

fn default_random_len() -> usize {
    constants::DEFAULT_RANDOM_LEN
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::APP_DIR)
            .join(constants::CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(dir) = std::env::var(constants::ENV_TEMP_DIR) {
            if dir.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: constants::ENV_TEMP_DIR.to_string(),
                    value: dir,
                }
                .into());
            }
            self.temp.dir = Some(PathBuf::from(dir));
        }

        if let Ok(prefix) = std::env::var(constants::ENV_PREFIX) {
            if prefix.contains(std::path::is_separator) {
                return Err(ConfigError::InvalidValue {
                    field: constants::ENV_PREFIX.to_string(),
                    value: prefix,
                }
                .into());
            }
            self.temp.prefix = prefix;
        }

        if let Ok(len) = std::env::var(constants::ENV_RANDOM_LEN) {
            self.temp.random_len = match len.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: constants::ENV_RANDOM_LEN.to_string(),
                        value: len,
                    }
                    .into())
                }
            };
        }

        if let Ok(level) = std::env::var(constants::ENV_LOG_LEVEL) {
            self.logging.level = level;
        }

        if let Ok(json) = std::env::var(constants::ENV_LOG_JSON) {
            self.logging.json = match json.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: constants::ENV_LOG_JSON.to_string(),
                        value: json,
                    }
                    .into())
                }
            };
        }

        Ok(())
    }

    /// Get the temp directory (with default)
    #[must_use]
    pub fn temp_dir(&self) -> PathBuf {
        self.temp
            .dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(constants::APP_DIR))
    }

    /// Render the configuration as TOML
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized.
    pub fn to_toml_string(&self) -> Result<String, Error> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError {
                error: e.to_string(),
            })
            .map_err(Into::into)
    }
}
