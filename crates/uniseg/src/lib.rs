//! # Uniseg
//!
//! Universal message segments and the contracts for translating them to and
//! from chat platform formats.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌───────────────────────┐
//! native event ──▶│ MessageBuilder        │──▶ UniMessage
//!                 └───────────────────────┘        │
//!                                                  ▼ application
//!                 ┌───────────────────────┐        │
//! platform API ◀──│ MessageExporter       │◀── UniMessage
//!                 │  export → Outbound    │
//!                 │  send_to → SendOutcome│
//!                 └───────────────────────┘
//! ```
//!
//! - **Core**: segments, targets, builder/exporter traits, rule tables
//! - **Runtime**: configuration loading and logging setup
//! - **Adapters**: platform crates such as `uniseg-adapter-opq`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use uniseg::prelude::*;
//! use uniseg_adapter_opq::OpqLoader;
//!
//! let config = ConfigLoader::new().load()?;
//! uniseg::runtime::logging::init_from_config(&config.logging);
//!
//! let opq: OpqLoader = config.load_loader()?;
//! let exporter = opq.exporter();
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: load `uniseg.toml`
//! - `yaml-config`: load `uniseg.yaml`
//! - `json-log`: JSON log output

pub use uniseg_core as core;
pub use uniseg_runtime as runtime;

/// Prelude module for convenient imports.
pub mod prelude {
    // Universal model
    pub use uniseg_core::{Segment, Target, UniMessage};

    // Mapping contracts
    pub use uniseg_core::{
        Destination, Loader, MessageBuilder, MessageExporter, SendOptions, SendOutcome,
        SupportAdapter,
    };

    // Configuration
    pub use uniseg_runtime::{ConfigLoader, UnisegConfig};
}
