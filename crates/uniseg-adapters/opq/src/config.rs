//! Configuration types for the OPQ adapter.
//!
//! Loaded from the `adapters.opq` section of the global `uniseg.yaml`
//! (or `uniseg.toml`) configuration file.
//!
//! # Example Configuration
//!
//! ```yaml
//! adapters:
//!   opq:
//!     # Name given to inbound files that carry no FileName
//!     file_name_placeholder: file.bin
//!     api_timeout_secs: 30
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// OPQ adapter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpqConfig {
    /// Display name used for inbound files without a name.
    pub file_name_placeholder: String,

    /// API call timeout in seconds.
    pub api_timeout_secs: u64,
}

fn default_file_name_placeholder() -> String {
    "file.bin".to_string()
}

fn default_api_timeout_secs() -> u64 {
    30
}

impl Default for OpqConfig {
    fn default() -> Self {
        Self {
            file_name_placeholder: default_file_name_placeholder(),
            api_timeout_secs: default_api_timeout_secs(),
        }
    }
}

impl OpqConfig {
    /// Returns the API call timeout.
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpqConfig::default();
        assert_eq!(config.file_name_placeholder, "file.bin");
        assert_eq!(config.api_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
file_name_placeholder: upload.dat
api_timeout_secs: 5
"#;

        let config: OpqConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.file_name_placeholder, "upload.dat");
        assert_eq!(config.api_timeout_secs, 5);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: OpqConfig = serde_yaml::from_str("api_timeout_secs: 10").unwrap();
        assert_eq!(config.file_name_placeholder, "file.bin");
        assert_eq!(config.api_timeout_secs, 10);
    }
}
