//! In-memory transport.
//!
//! Inbound payloads are queued up front and responses are collected, which
//! makes the transport useful for embedding the engine and for tests.

use std::collections::VecDeque;

use async_trait::async_trait;

use super::{Transport, TransportResult};
use crate::error::transport::TransportError;

/// Transport backed by in-memory queues.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    inbound: VecDeque<Vec<u8>>,
    outbound: Vec<String>,
    closed: bool,
}

impl MemoryTransport {
    /// Creates an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that will deliver `messages` in order.
    pub fn with_messages<I, M>(messages: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Vec<u8>>,
    {
        Self {
            inbound: messages.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Queues one more inbound payload.
    pub fn push(&mut self, message: impl Into<Vec<u8>>) {
        self.inbound.push_back(message.into());
    }

    /// Responses sent so far.
    pub fn sent(&self) -> &[String] {
        &self.outbound
    }

    /// Closes the transport; later sends fail.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn recv(&mut self) -> TransportResult<Option<Vec<u8>>> {
        if self.closed {
            return Ok(None);
        }
        Ok(self.inbound.pop_front())
    }

    async fn send(&mut self, body: String) -> TransportResult<()> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.outbound.push(body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_delivers_in_order() {
        let mut transport = MemoryTransport::with_messages(["first", "second"]);
        transport.push("third");

        assert_eq!(transport.recv().await.unwrap(), Some(b"first".to_vec()));
        assert_eq!(transport.recv().await.unwrap(), Some(b"second".to_vec()));
        assert_eq!(transport.recv().await.unwrap(), Some(b"third".to_vec()));
        assert_eq!(transport.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_closed_transport() {
        let mut transport = MemoryTransport::with_messages(["pending"]);
        transport.close();

        assert_eq!(transport.recv().await.unwrap(), None);
        assert!(matches!(
            transport.send("late".to_string()).await,
            Err(TransportError::Closed)
        ));
        assert!(transport.sent().is_empty());
    }
}
