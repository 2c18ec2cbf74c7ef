//! # Uniseg Adapter for OPQ
//!
//! This crate maps between the OPQ bot framework's message elements and the
//! universal segments of `uniseg-core`.
//!
//! ## Overview
//!
//! - [`OpqMessageBuilder`]: inbound OPQ elements → [`Segment`](uniseg_core::Segment)
//! - [`OpqMessageExporter`]: segments → OPQ elements, target resolution and
//!   dispatch to the OPQ send APIs
//! - [`OpqBot`]: bot handle over a host-supplied [`ApiCaller`]
//! - [`OpqLoader`]: creates the above from an [`OpqConfig`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use uniseg_adapter_opq::{OpqLoader, HttpApiCaller};
//! use uniseg_core::prelude::*;
//! use uniseg_core::Loader;
//!
//! let loader = OpqLoader::new();
//! let builder = loader.builder()?;
//! let exporter = loader.exporter();
//! let bot = loader.bot("10000", Arc::new(HttpApiCaller::new(post_json)));
//!
//! let incoming = builder.build_message(&event.message);
//! let reply = UniMessage::new().text("echo: ").text(incoming.extract_plain_text());
//! let outbound = exporter.export_message(&reply, Some(&bot)).await?;
//! exporter
//!     .send_to(Destination::Event(&event), &bot, outbound, SendOptions::new())
//!     .await?;
//! ```
//!
//! ## Capabilities
//!
//! File segments are sent as group file uploads; OPQ has no private file
//! upload, so such sends return [`SendOutcome::Skipped`](uniseg_core::SendOutcome).
//! Replies are only honoured in group chats.

pub mod api_caller;
pub mod bot;
pub mod builder;
pub mod config;
pub mod exporter;
pub mod loader;
pub mod model;

#[cfg(test)]
mod testing;

pub use api_caller::{ApiCaller, DisabledApiCaller, HttpApiCaller, PostJsonFn};
pub use bot::OpqBot;
pub use builder::OpqMessageBuilder;
pub use config::OpqConfig;
pub use exporter::{
    FileUpload, OpqEffect, OpqEffects, OpqMessageExporter, OpqOutbound, ReplyCorrelation,
};
pub use loader::{OpqLoader, get_adapter};
pub use model::{MessageEvent, OpqMessage, OpqSegment};
