// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Response envelope construction.
//!
//! Both builders return `None` when the entry must not be answered. Errors
//! outside the protocol taxonomy are coerced into a server error that carries
//! their top-level message only; the full chain goes to the error reporter.

use serde_json::Value;

use super::error::{ErrorKind, ErrorObject, ProtocolError};
use super::types::{Id, Response};
use crate::error::{get_error_reporting, ErrorContext, KapuError};

/// Builds a success envelope, or `None` if the entry is not answered.
pub fn build_success(result: Value, id: Id, notify: bool) -> Option<Response> {
    if !notify {
        return None;
    }

    Some(Response::success(id, result))
}

/// Builds an error envelope, or `None` if the entry is not answered.
pub fn build_error(error: anyhow::Error, id: Id, notify: bool) -> Option<Response> {
    if !notify {
        return None;
    }

    let error = coerce(error);
    Some(Response::error(id, ErrorObject::from(&error)))
}

/// Converts any error into a protocol error.
///
/// A `ProtocolError` is kept as is; anything else becomes a `ServerError`
/// with the error's own message.
pub fn coerce(error: anyhow::Error) -> ProtocolError {
    match error.downcast::<ProtocolError>() {
        Ok(protocol) => protocol,
        Err(other) => {
            let coerced = ProtocolError::server_error(other.to_string());
            get_error_reporting().report(
                ErrorContext::new(KapuError::Handler(other), "jsonrpc::response")
                    .with_details("Coerced to a server error")
                    .with_span_trace(),
            );
            coerced
        }
    }
}

/// Returns true if the error is an `InvalidRequest` protocol error.
pub fn is_invalid_request(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ProtocolError>()
        .is_some_and(|e| e.kind() == ErrorKind::InvalidRequest)
}
