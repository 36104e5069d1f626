// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Request decoding.
//!
//! Turns a raw payload into one or more candidate request entries. Failures
//! here abort the whole call: no batch exists yet to isolate them in.

use serde_json::Value;

use super::error::{ProtocolError, Result};

/// A decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A single entry; its response is sent unwrapped
    Single(Value),

    /// A non-empty batch of entries; responses are sent as a list
    Batch(Vec<Value>),
}

impl Decoded {
    /// Returns true if this is a batch.
    pub fn is_batch(&self) -> bool {
        matches!(self, Decoded::Batch(_))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        match self {
            Decoded::Single(_) => 1,
            Decoded::Batch(entries) => entries.len(),
        }
    }

    /// Always false: a decoded payload has at least one entry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the entries in input order.
    pub fn into_entries(self) -> Vec<Value> {
        match self {
            Decoded::Single(entry) => vec![entry],
            Decoded::Batch(entries) => entries,
        }
    }
}

/// Decodes a payload without a batch size limit.
pub fn decode(body: &[u8]) -> Result<Decoded> {
    decode_with_limit(body, usize::MAX)
}

/// Decodes a payload, rejecting batches larger than `max_batch_size`.
///
/// - Empty or malformed payloads fail with `ParseError`.
/// - Payloads that are neither an object nor a non-empty array fail with
///   `InvalidRequest`, as do oversized batches.
pub fn decode_with_limit(body: &[u8], max_batch_size: usize) -> Result<Decoded> {
    if body.is_empty() {
        return Err(ProtocolError::parse_error("Empty message"));
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| ProtocolError::parse_error(e.to_string()))?;

    match value {
        Value::Object(_) => Ok(Decoded::Single(value)),
        Value::Array(entries) if !entries.is_empty() => {
            if entries.len() > max_batch_size {
                return Err(ProtocolError::invalid_request(format!(
                    "Batch size {} exceeds limit of {}",
                    entries.len(),
                    max_batch_size
                )));
            }
            Ok(Decoded::Batch(entries))
        }
        _ => Err(ProtocolError::invalid_request("Request is not a valid object")),
    }
}
