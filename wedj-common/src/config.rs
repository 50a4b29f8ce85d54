//! Configuration loading and resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`WEDJ_BACKEND_URL`, `WEDJ_PLAYLIST_SECRET`)
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! A missing TOML file is not an error: the client starts with defaults and
//! logs a warning. An explicitly requested file that is missing or does not
//! parse is a configuration error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Environment variable overriding the backend base URL
pub const ENV_BACKEND_URL: &str = "WEDJ_BACKEND_URL";
/// Environment variable overriding the playlist shared secret
pub const ENV_PLAYLIST_SECRET: &str = "WEDJ_PLAYLIST_SECRET";

/// Compiled defaults
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_PLAYLIST_SECRET: &str = "wedj";
pub const DEFAULT_SEARCH_SUFFIX: &str = "official audio";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 120;

/// Configuration file contents
///
/// Every field is optional; anything left out falls through to the
/// compiled default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Render backend base URL
    #[serde(default)]
    pub backend_url: Option<String>,

    /// Shared secret unlocking playlist creation (empty disables the gate)
    #[serde(default)]
    pub playlist_secret: Option<String>,

    /// Text appended to every search query
    #[serde(default)]
    pub search_suffix: Option<String>,

    /// Song catalog used by `wedj rank`
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Asset polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay between attempts
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Attempts before an asset is given up on
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_max_attempts() -> u32 {
    DEFAULT_POLL_MAX_ATTEMPTS
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Fully resolved client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub backend_url: String,
    pub playlist_secret: String,
    pub search_suffix: String,
    pub catalog_path: Option<PathBuf>,
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            playlist_secret: DEFAULT_PLAYLIST_SECRET.to_string(),
            search_suffix: DEFAULT_SEARCH_SUFFIX.to_string(),
            catalog_path: None,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            poll_max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    /// Check value ranges after resolution
    pub fn validate(&self) -> Result<()> {
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "backend_url must be an http(s) URL, got {:?}",
                self.backend_url
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::Config("polling.interval_ms must be > 0".to_string()));
        }
        if self.poll_max_attempts == 0 {
            return Err(Error::Config("polling.max_attempts must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Resolves [`ClientConfig`] from CLI overrides, environment, TOML and defaults
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    config_path: Option<PathBuf>,
    backend_url: Option<String>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this TOML file instead of the platform default location
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Command-line backend URL (highest priority)
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = Some(url.into());
        self
    }

    /// Resolve and validate the configuration
    pub fn resolve(&self) -> Result<ClientConfig> {
        let toml_config = self.load_toml()?;
        let defaults = ClientConfig::default();

        // Priority 1: command line, 2: environment, 3: TOML, 4: default
        let backend_url = self
            .backend_url
            .clone()
            .or_else(|| env_value(ENV_BACKEND_URL))
            .or(toml_config.backend_url)
            .unwrap_or(defaults.backend_url);

        let playlist_secret = env_value(ENV_PLAYLIST_SECRET)
            .or(toml_config.playlist_secret)
            .unwrap_or(defaults.playlist_secret);

        let config = ClientConfig {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            playlist_secret,
            search_suffix: toml_config.search_suffix.unwrap_or(defaults.search_suffix),
            catalog_path: toml_config.catalog_path,
            poll_interval: Duration::from_millis(toml_config.polling.interval_ms),
            poll_max_attempts: toml_config.polling.max_attempts,
            log_level: toml_config.logging.level,
        };

        config.validate()?;
        debug!(backend_url = %config.backend_url, "Resolved client configuration");
        Ok(config)
    }

    fn load_toml(&self) -> Result<TomlConfig> {
        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return load_toml_config(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                load_toml_config(&path)
            }
            Some(path) => {
                warn!(
                    "No config file at {}, using defaults",
                    path.display()
                );
                Ok(TomlConfig::default())
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                Ok(TomlConfig::default())
            }
        }
    }
}

/// Platform config file location: `<config_dir>/wedj/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wedj").join("config.toml"))
}

/// Parse a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

/// Write a TOML configuration file, creating parent directories
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
