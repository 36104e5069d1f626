// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Error taxonomy for the JSON-RPC 2.0 engine.
//!
//! Every failure that reaches a caller is expressed as a [`ProtocolError`] whose
//! [`ErrorKind`] is bound to one of the codes reserved by the
//! [JSON-RPC 2.0 specification](https://www.jsonrpc.org/specification#error_object).
//! Procedure handlers may return a `ProtocolError` (wrapped in `anyhow::Error`)
//! to control the emitted code, message, and data precisely.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The closed set of error kinds the engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Parse error (-32700)
    /// The payload was empty or not well-formed JSON.
    ParseError,

    /// Invalid Request (-32600)
    /// The JSON sent is not a valid Request object.
    InvalidRequest,

    /// Method not found (-32601)
    /// The method does not exist or the caller may not use it.
    MethodNotFound,

    /// Invalid params (-32602)
    /// Params are missing, of the wrong shape, or fail their type expression.
    InvalidParams,

    /// Server error (-32603)
    /// Any other failure, including unexpected handler errors.
    ServerError,
}

impl ErrorKind {
    /// Returns the JSON-RPC code bound to this kind.
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::ParseError => -32700,
            ErrorKind::InvalidRequest => -32600,
            ErrorKind::MethodNotFound => -32601,
            ErrorKind::InvalidParams => -32602,
            ErrorKind::ServerError => -32603,
        }
    }

    /// Returns a string description of the kind.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::ParseError => "Parse error",
            ErrorKind::InvalidRequest => "Invalid Request",
            ErrorKind::MethodNotFound => "Method not found",
            ErrorKind::InvalidParams => "Invalid params",
            ErrorKind::ServerError => "Server error",
        }
    }
}

/// A typed protocol failure.
///
/// Displays as its message alone, so that an `anyhow::Error` wrapping it
/// reports exactly what the caller would see.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ProtocolError {
    kind: ErrorKind,
    message: String,
    data: Option<Value>,
    code: Option<i32>,
}

impl ProtocolError {
    /// Creates a new protocol error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
            code: None,
        }
    }

    /// Creates a parse error.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError, message)
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    /// Creates the method-not-found error.
    ///
    /// The message never names the method: unknown and forbidden methods must
    /// produce identical responses.
    pub fn method_not_found() -> Self {
        Self::new(ErrorKind::MethodNotFound, ErrorKind::MethodNotFound.description())
    }

    /// Creates an invalid params error.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParams, message)
    }

    /// Creates a server error.
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServerError, message)
    }

    /// Attaches additional data to the error.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Overrides the emitted code, e.g. an application-defined server error code.
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the code that will be emitted on the wire.
    pub fn code(&self) -> i32 {
        self.code.unwrap_or_else(|| self.kind.code())
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the attached data, if any.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }
}

/// JSON-RPC error object as it appears inside an error envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// The error code
    pub code: i32,

    /// A short description of the error
    pub message: String,

    /// Additional information about the error (omitted when empty)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&ProtocolError> for ErrorObject {
    fn from(error: &ProtocolError) -> Self {
        Self {
            code: error.code(),
            message: error.message.clone(),
            data: error.data.clone().filter(|data| !is_empty_data(data)),
        }
    }
}

impl From<ProtocolError> for ErrorObject {
    fn from(error: ProtocolError) -> Self {
        Self::from(&error)
    }
}

/// Returns true for data values that carry no information and are left off the wire.
pub fn is_empty_data(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Specialized Result type for engine steps that fail with a protocol error.
pub type Result<T> = std::result::Result<T, ProtocolError>;
