// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! The JSON-RPC 2.0 engine.
//!
//! The engine sequences decoding, structural validation, param validation,
//! dispatch, and response building for every entry of a payload. Each entry
//! runs on its own: a failure in one entry becomes that entry's error
//! response and never affects its siblings. Entries are processed in input
//! order, so batch responses keep that order too.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::decode::{decode_with_limit, Decoded};
use super::dispatch::{Authorizer, Dispatcher};
use super::error::ProtocolError;
use super::params::validate_params;
use super::registry::{ProcedureRegistry, ProcedureResult};
use super::response::{build_error, build_success, is_invalid_request};
use super::types::{Id, Params, Response};
use super::validation::validate_request;
use crate::error::transport::TransportError;
use crate::transport::Transport;

/// Status reported to the transport for every reply.
///
/// JSON-RPC errors travel inside the body; the transport always succeeds.
pub const TRANSPORT_STATUS_OK: u16 = 200;

/// Default upper bound on the number of entries in one batch.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Outbound reply handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Transport-level status, always [`TRANSPORT_STATUS_OK`]
    pub status: u16,

    /// Encoded response; empty when nothing is to be answered
    pub body: String,
}

/// The JSON-RPC 2.0 engine.
#[derive(Debug, Clone)]
pub struct Engine {
    dispatcher: Dispatcher,
    max_batch_size: usize,
}

impl Engine {
    /// Creates an engine over a registry and an authorizer.
    pub fn new(registry: ProcedureRegistry, authorizer: Arc<dyn Authorizer>) -> Self {
        Self::from_shared(Arc::new(registry), authorizer)
    }

    /// Creates an engine over an already shared registry.
    pub fn from_shared(registry: Arc<ProcedureRegistry>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry, authorizer),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    /// Sets the largest batch the engine accepts.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Returns the procedure registry.
    pub fn registry(&self) -> &ProcedureRegistry {
        self.dispatcher.registry()
    }

    /// Handles a raw payload.
    ///
    /// Returns the encoded response, or `None` when nothing is to be sent
    /// (a notification, or a batch made only of notifications).
    pub async fn handle(&self, body: &[u8]) -> Option<String> {
        let decoded = match decode_with_limit(body, self.max_batch_size) {
            Ok(decoded) => decoded,
            Err(error) => return Some(self.reject(error)),
        };

        match decoded {
            Decoded::Single(entry) => self.process_entry(&entry).await.map(|r| encode(&r)),
            Decoded::Batch(entries) => {
                let mut responses = Vec::with_capacity(entries.len());
                for entry in &entries {
                    if let Some(response) = self.process_entry(entry).await {
                        responses.push(response);
                    }
                }

                debug!(
                    entries = entries.len(),
                    responses = responses.len(),
                    "Batch processed"
                );

                if responses.is_empty() {
                    None
                } else {
                    Some(encode(&responses))
                }
            }
        }
    }

    /// Handles a raw payload and wraps the outcome for a transport.
    pub async fn respond(&self, body: &[u8]) -> Reply {
        Reply {
            status: TRANSPORT_STATUS_OK,
            body: self.handle(body).await.unwrap_or_default(),
        }
    }

    /// Encodes a whole-call failure, answered with a null id.
    pub fn reject(&self, error: ProtocolError) -> String {
        debug!(code = error.code(), message = error.message(), "Payload rejected");
        build_error(error.into(), Id::Null, true)
            .map(|r| encode(&r))
            .unwrap_or_default()
    }

    /// Calls a procedure from inside the server, bypassing the authorization gate.
    ///
    /// Params are not checked against the procedure's spec.
    pub async fn call_internal(&self, method: &str, params: Params) -> ProcedureResult {
        self.dispatcher.call(method, params, true).await
    }

    /// Answers payloads from `transport` until it closes.
    ///
    /// An inbound message over the transport's size bound is answered with a
    /// parse error and the loop continues. Any other transport failure ends
    /// the loop.
    pub async fn serve<T>(&self, transport: &mut T) -> Result<(), TransportError>
    where
        T: Transport + ?Sized,
    {
        info!("Engine serving");
        let mut handled: u64 = 0;

        loop {
            let body = match transport.recv().await {
                Ok(Some(body)) => body,
                Ok(None) => break,
                Err(TransportError::MessageTooLarge { size, max_size }) => {
                    warn!(size, max_size, "Inbound message rejected");
                    let error = ProtocolError::parse_error(format!(
                        "Message of {size} bytes exceeds limit of {max_size}"
                    ));
                    transport.send(self.reject(error)).await?;
                    continue;
                }
                Err(error) => return Err(error),
            };

            handled += 1;
            if let Some(response) = self.handle(&body).await {
                transport.send(response).await?;
            }
        }

        info!(handled, "Transport closed, engine stopped");
        Ok(())
    }

    async fn process_entry(&self, entry: &Value) -> Option<Response> {
        let has_id = entry.as_object().is_some_and(|o| o.contains_key("id"));
        let id = entry.get("id").and_then(Id::from_value).unwrap_or(Id::Null);

        match self.execute(entry).await {
            Ok(result) => build_success(result, id, has_id),
            Err(error) => {
                let notify = is_invalid_request(&error) || has_id;
                debug!(%id, notify, error = %error, "Entry failed");
                build_error(error, id, notify)
            }
        }
    }

    async fn execute(&self, entry: &Value) -> ProcedureResult {
        let call = validate_request(entry)?;
        validate_params(self.registry(), &call)?;
        self.dispatcher.call(&call.method, call.params, false).await
    }
}

fn encode<T: Serialize>(response: &T) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| {
        r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error: Error serializing response"},"id":null}"#.to_string()
    })
}
