//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use uniseg_core::ConfigurableLoader;

use super::error::{ConfigError, ConfigResult};

/// Root configuration structure.
///
/// ```yaml
/// logging:
///   level: debug
///   format: pretty
///   filters:
///     uniseg_adapter_opq: trace
///
/// adapters:
///   opq:
///     file_name_placeholder: file.bin
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UnisegConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Adapter sections, keyed by [`ConfigurableLoader::config_key`].
    #[serde(default)]
    pub adapters: HashMap<String, Value>,
}

impl UnisegConfig {
    /// Extracts the configuration section of an adapter.
    ///
    /// A missing section yields the adapter's default configuration.
    pub fn adapter_config<L: ConfigurableLoader>(&self) -> ConfigResult<L::Config> {
        let key = L::config_key();
        match self.adapters.get(key) {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| ConfigError::adapter_config(key, e)),
            None => {
                warn!(
                    adapter = key,
                    "No configuration found for adapter, using default"
                );
                Ok(Default::default())
            }
        }
    }

    /// Creates an adapter loader from its configuration section.
    pub fn load_loader<L: ConfigurableLoader>(&self) -> ConfigResult<L> {
        let config = self.adapter_config::<L>()?;
        debug!(adapter = L::config_key(), "Created adapter loader from configuration");
        Ok(L::from_config(config))
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Very verbose, includes API payloads.
    Trace,
    /// Export and dispatch decisions.
    Debug,
    /// Default.
    #[default]
    Info,
    /// Skipped capabilities and fallbacks.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line compact output.
    #[default]
    Compact,
    /// Default `tracing-subscriber` format.
    Full,
    /// Multi-line human-friendly output.
    Pretty,
    /// Newline-delimited JSON.
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// The file named by `file_path`.
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global log level.
    pub level: LogLevel,
    /// Line format.
    pub format: LogFormat,
    /// Destination.
    pub output: LogOutput,
    /// Span events.
    pub span_events: SpanEventConfig,
    /// Include thread ids.
    pub thread_ids: bool,
    /// Include source file and line.
    pub file_location: bool,
    /// Log file for [`LogOutput::File`].
    pub file_path: Option<PathBuf>,
    /// Per-module level overrides.
    pub filters: HashMap<String, LogLevel>,
}
