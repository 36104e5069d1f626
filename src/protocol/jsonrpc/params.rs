// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Parameter validation against a procedure's declared parameter spec.
//!
//! A spec is either a list of named parameters, each with a type expression,
//! or a single type expression for the whole params value. The whole-value
//! form is rewritten into a one-entry named spec under [`WHOLE_KEY`] so both
//! forms share one checking algorithm.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use super::error::{ProtocolError, Result};
use super::registry::ProcedureRegistry;
use super::typecheck::{TypeExpr, ValueKind};
use super::types::{Call, Params};

/// Synthetic key the whole params value is wrapped under.
pub const WHOLE_KEY: &str = "*";

/// Declared parameters of a procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamSpec {
    /// Named parameters, checked in declaration order
    Named(Vec<(String, TypeExpr)>),

    /// One expression applied to the whole params value
    Whole(TypeExpr),
}

impl Default for ParamSpec {
    fn default() -> Self {
        ParamSpec::Named(Vec::new())
    }
}

impl ParamSpec {
    /// A spec that accepts any params, including none.
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a named spec from `(name, expression)` pairs.
    pub fn named<I, K, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<TypeExpr>,
    {
        ParamSpec::Named(
            entries
                .into_iter()
                .map(|(name, expr)| (name.into(), expr.into()))
                .collect(),
        )
    }

    /// Builds a whole-value spec.
    pub fn whole(expr: impl Into<TypeExpr>) -> Self {
        ParamSpec::Whole(expr.into())
    }

    /// Returns true if the spec declares nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            ParamSpec::Named(entries) => entries.is_empty(),
            ParamSpec::Whole(expr) => expr.is_empty(),
        }
    }

    /// Renders the spec as JSON, keeping declaration order.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "null".to_string())
    }
}

impl Serialize for ParamSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ParamSpec::Named(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (name, expr) in entries {
                    map.serialize_entry(name, expr)?;
                }
                map.end()
            }
            ParamSpec::Whole(expr) => expr.serialize(serializer),
        }
    }
}

/// Rewrites a whole-value spec and its params into keyed form.
///
/// The spec becomes `[("*", expr)]` and the params become `{"*": params}`.
pub fn wrap_whole(expr: &TypeExpr, params: &Params) -> (Vec<(String, TypeExpr)>, Params) {
    let mut wrapped = Map::new();
    wrapped.insert(WHOLE_KEY.to_string(), params.to_value());
    (
        vec![(WHOLE_KEY.to_string(), expr.clone())],
        Params::Named(wrapped),
    )
}

/// Validates a call's params against the registry.
///
/// Fails with `MethodNotFound` if the method is not registered, and with
/// `InvalidParams` if the params do not satisfy the declared spec.
pub fn validate_params(registry: &ProcedureRegistry, call: &Call) -> Result<()> {
    let descriptor = registry
        .get(&call.method)
        .ok_or_else(ProtocolError::method_not_found)?;

    check_spec(descriptor.params(), &call.params)
}

/// Checks params against a spec.
pub fn check_spec(spec: &ParamSpec, params: &Params) -> Result<()> {
    if params.is_empty() && !spec.is_empty() {
        return Err(ProtocolError::invalid_params(format!(
            "Expected params: {}",
            spec.to_json()
        )));
    }

    match spec {
        ParamSpec::Whole(expr) => {
            let (entries, wrapped) = wrap_whole(expr, params);
            check_keyed(&entries, &wrapped)
        }
        ParamSpec::Named(entries) => check_keyed(entries, params),
    }
}

fn check_keyed(entries: &[(String, TypeExpr)], params: &Params) -> Result<()> {
    for (key, expr) in entries {
        let value = params.get(key).unwrap_or(&Value::Null);
        if !expr.matches(value) {
            return Err(ProtocolError::invalid_params(format!(
                "Unexpected type {} for {}, expected: {}",
                ValueKind::of(value),
                key,
                expr
            )));
        }
    }

    Ok(())
}
