//! Adapter loaders and the link-time adapter registry.
//!
//! Each adapter crate provides a [`Loader`] that hands out its builder and
//! exporter, and contributes one [`AdapterEntry`] to [`ADAPTER_REGISTRY`] so
//! the host can discover which adapters are linked in:
//!
//! ```rust,ignore
//! #[uniseg_core::linkme::distributed_slice(uniseg_core::ADAPTER_REGISTRY)]
//! #[linkme(crate = uniseg_core::linkme)]
//! static OPQ_ENTRY: AdapterEntry = AdapterEntry::new(SupportAdapter::Opq, "uniseg-adapter-opq");
//! ```

use linkme::distributed_slice;
use serde::de::DeserializeOwned;

use crate::builder::MessageBuilder;
use crate::error::RuleError;
use crate::exporter::MessageExporter;
use crate::target::SupportAdapter;

/// Hands out the builder and exporter of one adapter.
pub trait Loader: Send + Sync {
    /// The adapter's inbound mapper.
    type Builder: MessageBuilder;
    /// The adapter's outbound mapper and dispatcher.
    type Exporter: MessageExporter;

    /// Returns the adapter identity.
    fn adapter(&self) -> SupportAdapter;

    /// Creates the builder.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] if the adapter's rule table is invalid.
    fn builder(&self) -> Result<Self::Builder, RuleError>;

    /// Creates the exporter.
    fn exporter(&self) -> Self::Exporter;
}

/// A loader that can be created from its configuration section.
///
/// The runtime deserializes `adapters.<name>` from the configuration file and
/// calls [`from_config`](ConfigurableLoader::from_config).
pub trait ConfigurableLoader: Loader + Sized {
    /// Configuration section type.
    type Config: DeserializeOwned + Default;

    /// Name of the configuration section under `adapters`.
    fn config_key() -> &'static str;

    /// Creates the loader from its configuration.
    fn from_config(config: Self::Config) -> Self;
}

// =============================================================================
// Adapter Registry (linkme distributed slice)
// =============================================================================

/// Registration record of a linked-in adapter crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterEntry {
    /// Adapter identity.
    pub adapter: SupportAdapter,
    /// Name of the crate providing it.
    pub crate_name: &'static str,
}

impl AdapterEntry {
    /// Creates an entry.
    pub const fn new(adapter: SupportAdapter, crate_name: &'static str) -> Self {
        Self {
            adapter,
            crate_name,
        }
    }
}

/// Registry of adapters linked into the binary.
/// Each adapter crate contributes one entry.
#[distributed_slice]
pub static ADAPTER_REGISTRY: [AdapterEntry];

/// Returns all registered adapters.
pub fn registered_adapters() -> impl Iterator<Item = &'static AdapterEntry> {
    ADAPTER_REGISTRY.iter()
}

/// Looks up the registration of an adapter.
pub fn find_adapter(adapter: SupportAdapter) -> Option<&'static AdapterEntry> {
    ADAPTER_REGISTRY.iter().find(|entry| entry.adapter == adapter)
}
