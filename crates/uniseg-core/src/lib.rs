//! # Uniseg Core
//!
//! The platform-agnostic half of the universal segment layer.
//!
//! This crate defines the universal message model and the contracts every
//! platform adapter implements:
//!
//! - **Segments**: [`Segment`] and [`UniMessage`], the universal vocabulary
//! - **Targets**: [`Target`], a resolved group or private destination
//! - **Builder**: [`MessageBuilder`], native element → segment
//! - **Exporter**: [`MessageExporter`], segment → native element, plus dispatch
//! - **Rules**: [`RuleSet`], validated per-tag field tables for inbound mapping
//! - **Loaders**: [`Loader`] and the link-time [`ADAPTER_REGISTRY`]
//!
//! ## Data Flow
//!
//! ```text
//!                ┌─────────┐                     ┌──────────┐
//! native event ─▶│ Builder │─▶ UniMessage ─▶ app ─▶│ Exporter │─▶ platform API
//!                └─────────┘                     └──────────┘
//!                                       Outbound { elements, effects }
//! ```

pub mod bot;
pub mod builder;
pub mod error;
pub mod event;
pub mod exporter;
pub mod loader;
pub mod rules;
pub mod segment;
pub mod target;

#[doc(hidden)]
pub use linkme;

pub use bot::{Bot, BoxedBot, downcast_bot};
pub use builder::MessageBuilder;
pub use error::{ApiError, ApiResult, ExportError, ExportResult, RuleError};
pub use event::{Event, downcast_event};
pub use exporter::{
    Capability, Destination, Exported, ExportedOf, MessageExporter, Outbound, OutboundOf,
    SendOptions, SendOutcome, SideEffects,
};
pub use loader::{
    ADAPTER_REGISTRY, AdapterEntry, ConfigurableLoader, Loader, find_adapter, registered_adapters,
};
pub use rules::{BuildFn, BuildRule, FieldDefault, FieldSpec, Fields, NativeElement, RuleSet};
pub use segment::{
    At, AtAll, Emoji, File, Hyper, HyperFormat, Image, Media, Reference, Reply, Segment, Text,
    UniMessage,
};
pub use target::{Conversation, ConversationKind, SupportAdapter, SupportScope, Target};

/// Prelude for common imports.
pub mod prelude {
    pub use super::builder::MessageBuilder;
    pub use super::exporter::{Destination, MessageExporter, SendOptions, SendOutcome};
    pub use super::segment::{Segment, UniMessage};
    pub use super::target::{SupportAdapter, Target};
}
