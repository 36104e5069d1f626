//! Transport error module.
//!
//! This module defines error types that may occur while reading request bodies
//! from, or writing response bodies to, a transport.

use std::io;
use thiserror::Error;

/// Errors that can occur during transport operations.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Error when reading from the inbound stream.
    #[error("Transport read error: {0}")]
    ReadError(#[from] io::Error),

    /// Error when writing to the outbound stream.
    #[error("Transport write error: {0}")]
    WriteError(String),

    /// An inbound message exceeded the configured size limit.
    #[error("Message size exceeds maximum allowed: {size} > {max_size}")]
    MessageTooLarge {
        /// The actual size of the message in bytes
        size: usize,
        /// The maximum allowed size in bytes
        max_size: usize,
    },

    /// Error when the transport is closed.
    #[error("Transport closed")]
    Closed,
}
