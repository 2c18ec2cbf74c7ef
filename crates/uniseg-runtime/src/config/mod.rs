//! Configuration module for the uniseg runtime.
//!
//! Layered loading of the logging settings and per-adapter sections from
//! TOML/YAML files and `UNISEG_*` environment variables.

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig, UnisegConfig};
