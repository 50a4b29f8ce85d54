//! Common error types for WE-DJ

use thiserror::Error;

/// Common result type for WE-DJ operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across WE-DJ crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parse error (config files, catalogs)
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parse error (catalogs)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid user input or data value
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
