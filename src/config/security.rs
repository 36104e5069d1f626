//! Security configuration module.
//!
//! Callers of the served engine hold the capability tokens listed here. A
//! procedure whose access requirement is not among them is invisible.

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Security configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// Capability tokens granted to every caller
    pub granted_capabilities: Vec<String>,

    /// Grants every capability, ignoring `granted_capabilities`
    pub allow_unrestricted: bool,
}

impl Validate for SecurityConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(position) = self
            .granted_capabilities
            .iter()
            .position(|token| token.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(format!(
                "granted_capabilities[{position}] cannot be empty"
            )));
        }

        Ok(())
    }
}
