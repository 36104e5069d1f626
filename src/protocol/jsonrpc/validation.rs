// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Structural validation of request entries.
//!
//! Checks a single decoded entry against the JSON-RPC 2.0 request envelope and
//! turns it into a typed [`Call`]. Every failure is an `InvalidRequest`.

use serde_json::Value;

use super::error::{ProtocolError, Result};
use super::types::{Call, Id, Params, JSONRPC_VERSION};

/// Validates a single decoded request entry.
///
/// Performs the following checks:
/// - The entry is a non-empty object
/// - `jsonrpc` is exactly "2.0"
/// - `method` is a string
/// - `params`, if present and not null, is an array or an object
/// - `id`, if present, is a string, a number, or null
pub fn validate_request(entry: &Value) -> Result<Call> {
    let object = match entry.as_object() {
        Some(object) if !object.is_empty() => object,
        _ => return Err(ProtocolError::invalid_request("Request is not a valid object")),
    };

    if object.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err(ProtocolError::invalid_request("Unknown version"));
    }

    let method = object
        .get("method")
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::invalid_request("Invalid request"))?;

    let params = Params::from_member(object.get("params"))
        .ok_or_else(|| ProtocolError::invalid_request("Invalid request"))?;

    let id = match object.get("id") {
        None => None,
        Some(value) => Some(
            Id::from_value(value).ok_or_else(|| ProtocolError::invalid_request("Invalid request"))?,
        ),
    };

    Ok(Call {
        method: method.to_string(),
        params,
        id,
    })
}
