//! Request limits configuration module.

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;
use crate::protocol::jsonrpc::DEFAULT_MAX_BATCH_SIZE;
use serde::{Deserialize, Serialize};

/// Hard ceiling accepted for `max_batch_size`.
pub const MAX_BATCH_SIZE_CEILING: usize = 10_000;

/// Request limits configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest number of entries accepted in one batch
    pub max_batch_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl Validate for LimitsConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_batch_size == 0 || self.max_batch_size > MAX_BATCH_SIZE_CEILING {
            return Err(ConfigError::ValueOutOfRange {
                key: "limits.max_batch_size".to_string(),
                message: format!("must be between 1 and {MAX_BATCH_SIZE_CEILING}"),
            });
        }

        Ok(())
    }
}
