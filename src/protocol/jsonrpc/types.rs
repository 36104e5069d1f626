// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Types for the JSON-RPC 2.0 protocol.
//!
//! This module defines the request identifier, the two parameter
//! representations (positional and named), the validated call produced by the
//! structural validator, and the response envelope.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

use super::error::ErrorObject;

/// The protocol version every envelope must carry.
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC request identifier.
///
/// Can be a string, number, or null as per the JSON-RPC 2.0 specification.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier
    String(String),

    /// Numeric identifier
    Number(Number),

    /// Null identifier (also used when the request id could not be read)
    Null,
}

impl Id {
    /// Reads an identifier from a decoded value.
    ///
    /// Returns `None` for values that are not valid identifiers.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Id::String(s.clone())),
            Value::Number(n) => Some(Id::Number(n.clone())),
            Value::Null => Some(Id::Null),
            _ => None,
        }
    }
}

impl From<i64> for Id {
    fn from(id: i64) -> Self {
        Id::Number(id.into())
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Id::String(id.to_string())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "{}", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

/// Call parameters.
///
/// Positional and named arguments are kept apart; absence is its own variant.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    /// No params member, or an explicit `null`
    #[default]
    None,

    /// Positional arguments
    Positional(Vec<Value>),

    /// Named arguments
    Named(Map<String, Value>),
}

impl Params {
    /// Reads params from the `params` member of a request.
    ///
    /// Returns `None` if the member holds something other than an array,
    /// an object, or null.
    pub fn from_member(member: Option<&Value>) -> Option<Self> {
        match member {
            None | Some(Value::Null) => Some(Params::None),
            Some(Value::Array(items)) => Some(Params::Positional(items.clone())),
            Some(Value::Object(map)) => Some(Params::Named(map.clone())),
            Some(_) => None,
        }
    }

    /// Returns true if no argument was supplied.
    pub fn is_empty(&self) -> bool {
        match self {
            Params::None => true,
            Params::Positional(items) => items.is_empty(),
            Params::Named(map) => map.is_empty(),
        }
    }

    /// Looks up an argument by key.
    ///
    /// Positional arguments are addressed by their decimal index.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Params::None => None,
            Params::Positional(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            Params::Named(map) => map.get(key),
        }
    }

    /// Returns the named arguments, if the params are named.
    pub fn as_named(&self) -> Option<&Map<String, Value>> {
        match self {
            Params::Named(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the positional arguments, if the params are positional.
    pub fn as_positional(&self) -> Option<&[Value]> {
        match self {
            Params::Positional(items) => Some(items),
            _ => None,
        }
    }

    /// Converts the params back to a single JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Params::None => Value::Null,
            Params::Positional(items) => Value::Array(items.clone()),
            Params::Named(map) => Value::Object(map.clone()),
        }
    }
}

impl From<Value> for Params {
    /// Converts a JSON value into params; scalars are wrapped as a single positional argument.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Params::None,
            Value::Array(items) => Params::Positional(items),
            Value::Object(map) => Params::Named(map),
            other => Params::Positional(vec![other]),
        }
    }
}

/// A request entry that passed structural validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Name of the method to be invoked
    pub method: String,

    /// Method parameters
    pub params: Params,

    /// Request identifier, `None` for notifications
    pub id: Option<Id>,
}

impl Call {
    /// Returns true if this call is a notification (no id member).
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// A JSON-RPC 2.0 response envelope.
///
/// Contains either a result or an error, never both.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Response {
    /// JSON-RPC protocol version, always "2.0"
    pub jsonrpc: String,

    /// The result of the method invocation, if successful
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<Value>,

    /// The error object, if an error occurred
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,

    /// Same identifier as the request this is responding to
    pub id: Id,
}

impl Response {
    /// Creates a new successful JSON-RPC 2.0 response.
    pub fn success(id: Id, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Creates a new error JSON-RPC 2.0 response.
    pub fn error(id: Id, error: ErrorObject) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }

    /// Returns true if this response contains a successful result.
    pub fn is_success(&self) -> bool {
        self.result.is_some() && self.error.is_none()
    }
}

// A present `"result": null` is a successful null result, not an absent member.
fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
