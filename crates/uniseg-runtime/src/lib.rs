//! Uniseg Runtime - configuration and logging for hosts of the uniseg adapters.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `UnisegConfig`)
//! - Per-adapter configuration sections handed to
//!   [`ConfigurableLoader`](uniseg_core::ConfigurableLoader)s
//! - Logging configuration (`LoggingBuilder`)
//!
//! ```ignore
//! use uniseg_runtime::{ConfigLoader, logging};
//! use uniseg_adapter_opq::OpqLoader;
//!
//! let config = ConfigLoader::new().load()?;
//! logging::init_from_config(&config.logging);
//!
//! let opq: OpqLoader = config.load_loader()?;
//! ```

pub mod config;
pub mod logging;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, LoggingConfig, UnisegConfig};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
