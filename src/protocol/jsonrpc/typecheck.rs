// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Type expressions for procedure parameters.
//!
//! A type expression is a compact string:
//!
//! ```text
//! expr  := ["?"] base ["[]"]*
//! base  := any | array | bool | boolean | int | integer | float | double
//!        | numeric | str | string | alpha | alnum | scalar | null
//! ```
//!
//! A leading `?` accepts null. A trailing `[]` requires a list (or map) whose
//! every element matches the expression with one `[]` removed; the check
//! recurses, so `?int[][]` is a list of lists of nullable integers.
//!
//! Checking never fails: [`matches`] is a pure predicate and the caller decides
//! how a mismatch is reported.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The closed set of kinds a decoded JSON value can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// A number without fraction or exponent
    Integer,
    /// A number with fraction or exponent
    Float,
    /// A string
    String,
    /// A list
    Array,
    /// A map
    Object,
}

impl ValueKind {
    /// Classifies a decoded value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            // Integers past the signed 64-bit range decode as floats.
            Value::Number(n) if n.is_i64() => ValueKind::Integer,
            Value::Number(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Returns the name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }

    fn is_scalar(&self) -> bool {
        matches!(
            self,
            ValueKind::Boolean | ValueKind::Integer | ValueKind::Float | ValueKind::String
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A type expression as declared in a procedure descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeExpr(String);

impl TypeExpr {
    /// Wraps an expression string.
    ///
    /// Expressions are not parsed up front; an unknown base name simply
    /// never matches.
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    /// Returns the expression text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the expression text is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks a value against this expression.
    pub fn matches(&self, value: &Value) -> bool {
        matches(value, &self.0)
    }
}

impl From<&str> for TypeExpr {
    fn from(expr: &str) -> Self {
        Self::new(expr)
    }
}

impl From<String> for TypeExpr {
    fn from(expr: String) -> Self {
        Self(expr)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks `value` against the type expression `expr`.
pub fn matches(value: &Value, expr: &str) -> bool {
    if value.is_null() && expr.starts_with('?') {
        return true;
    }

    if let Some(element) = expr.strip_suffix("[]") {
        return match value {
            Value::Array(items) => items.iter().all(|item| matches(item, element)),
            Value::Object(map) => map.values().all(|item| matches(item, element)),
            _ => false,
        };
    }

    let kind = ValueKind::of(value);
    match expr.trim_start_matches('?') {
        "any" => true,
        "array" => matches!(kind, ValueKind::Array | ValueKind::Object),
        "bool" | "boolean" => kind == ValueKind::Boolean,
        "int" | "integer" => kind == ValueKind::Integer,
        "float" | "double" => kind == ValueKind::Float,
        "numeric" => match value {
            Value::Number(_) => true,
            Value::String(text) => is_numeric_str(text),
            _ => false,
        },
        "str" | "string" => kind == ValueKind::String,
        "alpha" => value
            .as_str()
            .is_some_and(|text| !text.is_empty() && text.bytes().all(|b| b.is_ascii_alphabetic())),
        "alnum" => value.as_str().is_some_and(|text| {
            !text.is_empty() && text.bytes().all(|b| b.is_ascii_alphanumeric())
        }),
        "scalar" => kind.is_scalar(),
        "null" => kind == ValueKind::Null,
        _ => false,
    }
}

/// Returns true if `text` is a decimal number, optionally signed, with an
/// optional fraction and exponent. Surrounding whitespace is allowed.
fn is_numeric_str(text: &str) -> bool {
    let bytes = text
        .trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'))
        .as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let integral = count_digits(&bytes[pos..]);
    pos += integral;

    let mut fractional = 0;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        fractional = count_digits(&bytes[pos..]);
        pos += fractional;
    }

    if integral == 0 && fractional == 0 {
        return false;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let exponent = count_digits(&bytes[pos..]);
        if exponent == 0 {
            return false;
        }
        pos += exponent;
    }

    pos == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
