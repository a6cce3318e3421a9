//! Configuration file
//!
//! ```json
//! {"data_dir": "./medvault-data", "max_key_bytes": 44, "max_value_bytes": 1024,
//!  "id_length": 30, "log_level": "info"}
//! ```
//!
//! Only `data_dir` is required.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use super::errors::{CliError, CliResult};
use crate::records::DEFAULT_ID_LENGTH;
use crate::storage::{SlotLimits, DEFAULT_MAX_KEY_BYTES, DEFAULT_MAX_VALUE_BYTES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    /// Largest accepted record id, in bytes
    #[serde(default = "default_max_key_bytes")]
    pub max_key_bytes: usize,

    /// Largest accepted serialized record, in bytes
    #[serde(default = "default_max_value_bytes")]
    pub max_value_bytes: usize,

    /// Length of generated record ids
    #[serde(default = "default_id_length")]
    pub id_length: usize,

    /// Default log filter, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_key_bytes() -> usize {
    DEFAULT_MAX_KEY_BYTES
}
fn default_max_value_bytes() -> usize {
    DEFAULT_MAX_VALUE_BYTES
}
fn default_id_length() -> usize {
    DEFAULT_ID_LENGTH
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::Config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.is_empty() {
            return Err(CliError::Config("data_dir must not be empty".into()));
        }

        if self.max_key_bytes == 0 {
            return Err(CliError::Config("max_key_bytes must be > 0".into()));
        }

        if self.max_value_bytes == 0 {
            return Err(CliError::Config("max_value_bytes must be > 0".into()));
        }

        if self.id_length == 0 || self.id_length > self.max_key_bytes {
            return Err(CliError::Config(format!(
                "id_length must be between 1 and max_key_bytes ({})",
                self.max_key_bytes
            )));
        }

        EnvFilter::try_new(&self.log_level).map_err(|e| {
            CliError::Config(format!("Invalid log_level '{}': {}", self.log_level, e))
        })?;

        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn slot_limits(&self) -> SlotLimits {
        SlotLimits::new(self.max_key_bytes, self.max_value_bytes)
    }
}
