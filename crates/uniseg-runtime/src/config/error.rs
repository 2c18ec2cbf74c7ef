//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found at the specified path.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file extension is unknown or its format feature is disabled.
    #[error("Unsupported or disabled configuration file format: .{0}")]
    UnsupportedFormat(String),

    /// Failed to parse or extract the configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// An adapter section does not match the adapter's configuration type.
    #[error("Invalid configuration for adapter '{adapter}': {message}")]
    AdapterConfig {
        /// Section name under `adapters`.
        adapter: String,
        /// Deserialization error.
        message: String,
    },
}

impl ConfigError {
    /// Creates an adapter configuration error.
    pub fn adapter_config(adapter: impl Into<String>, message: impl ToString) -> Self {
        Self::AdapterConfig {
            adapter: adapter.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
