//! Server configuration module.
//!
//! This module defines configuration related to the process serving the
//! engine: its name, transport, runtime threads, and inbound message bound.

use super::ConfigResult;
use super::Validate;
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Default upper bound on one inbound message, in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024; // 10 MiB

/// Transport carrying request bodies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    /// Newline-delimited bodies over standard I/O
    #[default]
    Stdio,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Name of the server (used in logs)
    pub name: String,

    /// Transport to use for communication
    pub transport: TransportType,

    /// Number of runtime worker threads
    pub worker_threads: usize,

    /// Maximum inbound message size in bytes
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "kapu-rpc".to_string(),
            transport: TransportType::default(),
            worker_threads: num_cpus::get(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Server name cannot be empty".to_string(),
            ));
        }

        if self.worker_threads == 0 {
            return Err(ConfigError::ValidationError(
                "worker_threads must be greater than 0".to_string(),
            ));
        }

        if self.max_message_size == 0 {
            return Err(ConfigError::ValidationError(
                "max_message_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
