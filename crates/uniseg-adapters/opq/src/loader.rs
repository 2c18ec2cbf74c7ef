//! OPQ adapter loader and registry entry.

use std::sync::Arc;

use uniseg_core::{AdapterEntry, ConfigurableLoader, Loader, RuleError, SupportAdapter};

use crate::api_caller::ApiCaller;
use crate::bot::OpqBot;
use crate::builder::OpqMessageBuilder;
use crate::config::OpqConfig;
use crate::exporter::OpqMessageExporter;

#[uniseg_core::linkme::distributed_slice(uniseg_core::ADAPTER_REGISTRY)]
#[linkme(crate = uniseg_core::linkme)]
static OPQ_ADAPTER: AdapterEntry = AdapterEntry::new(SupportAdapter::Opq, env!("CARGO_PKG_NAME"));

/// Returns the identity of this adapter.
pub fn get_adapter() -> SupportAdapter {
    SupportAdapter::Opq
}

/// Creates OPQ builders, exporters and bots from one configuration.
#[derive(Debug, Clone, Default)]
pub struct OpqLoader {
    config: OpqConfig,
}

impl OpqLoader {
    /// Creates a loader with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the adapter configuration.
    pub fn config(&self) -> &OpqConfig {
        &self.config
    }

    /// Creates a bot handle using the configured API timeout.
    pub fn bot(&self, self_id: impl Into<String>, caller: Arc<dyn ApiCaller>) -> OpqBot {
        OpqBot::new(self_id, caller).with_timeout(self.config.api_timeout())
    }
}

impl Loader for OpqLoader {
    type Builder = OpqMessageBuilder;
    type Exporter = OpqMessageExporter;

    fn adapter(&self) -> SupportAdapter {
        get_adapter()
    }

    fn builder(&self) -> Result<OpqMessageBuilder, RuleError> {
        OpqMessageBuilder::with_config(&self.config)
    }

    fn exporter(&self) -> OpqMessageExporter {
        OpqMessageExporter::new()
    }
}

impl ConfigurableLoader for OpqLoader {
    type Config = OpqConfig;

    fn config_key() -> &'static str {
        "opq"
    }

    fn from_config(config: OpqConfig) -> Self {
        Self { config }
    }
}
