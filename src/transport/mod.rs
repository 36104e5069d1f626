//! Transport layer carrying request bodies to the engine.
//!
//! A transport hands the engine one raw payload at a time and writes back
//! whatever the engine answers. JSON-RPC errors are never transport errors:
//! they travel inside the response body.

use async_trait::async_trait;

use crate::error::transport::TransportError;

pub mod memory;
pub mod stdio;

pub use memory::MemoryTransport;
pub use stdio::StdioTransport;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// A bidirectional message channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send {
    /// Receives the next inbound payload.
    ///
    /// Returns `Ok(None)` once the peer has closed the channel.
    async fn recv(&mut self) -> TransportResult<Option<Vec<u8>>>;

    /// Sends one encoded response.
    async fn send(&mut self, body: String) -> TransportResult<()>;
}
