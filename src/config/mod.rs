//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/facility-geo/config.toml

pub mod defaults;

use crate::constants::api::ACCESS_TOKEN_ENV;
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Reverse geocoding provider
    #[serde(default)]
    pub geocoder: GeocoderConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Geometry codec settings
    #[serde(default)]
    pub codec: CodecConfig,
}

/// Reverse geocoding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Provider base URL
    #[serde(default = "default_geocoder_url")]
    pub base_url: String,

    /// Provider access token; falls back to `MAPBOX_ACCESS_TOKEN` when empty
    #[serde(default)]
    pub access_token: String,

    /// Preferred response language (e.g. "es")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// HTTP timeout in seconds; no timeout when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Geometry codec settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Minimum fractional digits written for each coordinate
    #[serde(default = "default_precision")]
    pub precision: usize,
}

// Default value functions for serde
fn default_geocoder_url() -> String {
    DEFAULT_GEOCODER_URL.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_precision() -> usize {
    DEFAULT_PRECISION
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_url(),
            access_token: String::new(),
            language: None,
            timeout_secs: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
        }
    }
}

impl GeocoderConfig {
    /// The configured token, or the environment fallback
    pub fn resolved_token(&self) -> Option<String> {
        if !self.access_token.is_empty() {
            return Some(self.access_token.clone());
        }
        std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .filter(|token| !token.is_empty())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path, creating it with defaults if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            let mut config: Config = toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })?;
            config.codec.precision = config.codec.precision.clamp(MIN_PRECISION, MAX_PRECISION);
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key". Returns None for unknown keys.
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoder", "base_url"] => Some(self.geocoder.base_url.clone()),
            ["geocoder", "access_token"] => Some(self.geocoder.access_token.clone()),
            ["geocoder", "language"] => Some(self.geocoder.language.clone().unwrap_or_default()),
            ["geocoder", "timeout_secs"] => Some(
                self.geocoder
                    .timeout_secs
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
            ),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["codec", "precision"] => Some(self.codec.precision.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// An empty value clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoder", "base_url"] => {
                self.geocoder.base_url = value.trim_end_matches('/').to_string();
            }
            ["geocoder", "access_token"] => {
                self.geocoder.access_token = value.to_string();
            }
            ["geocoder", "language"] => {
                self.geocoder.language = (!value.is_empty()).then(|| value.to_string());
            }
            ["geocoder", "timeout_secs"] => {
                self.geocoder.timeout_secs = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|_| {
                        Error::Config(format!("Invalid timeout value: {}", value))
                    })?)
                };
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }

            ["codec", "precision"] => {
                let precision: usize = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid precision value: {}", value))
                })?;
                if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
                    return Err(Error::Config(format!(
                        "Precision {} must be between {} and {} digits",
                        precision, MIN_PRECISION, MAX_PRECISION
                    )));
                }
                self.codec.precision = precision;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "geocoder.base_url",
            "geocoder.access_token",
            "geocoder.language",
            "geocoder.timeout_secs",
            "server.host",
            "server.port",
            "codec.precision",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
