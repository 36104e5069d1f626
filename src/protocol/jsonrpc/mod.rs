// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! JSON-RPC 2.0 protocol engine.
//!
//! This module implements the server side of the
//! [JSON-RPC 2.0 specification](https://www.jsonrpc.org/specification): it takes
//! a raw payload, answers every request entry in it, and stays silent for
//! notifications.
//!
//! # Features
//!
//! - Single and batch payloads, answered in input order
//! - Structural request validation with per-entry error isolation
//! - Declarative param specs checked by a small type-expression language
//! - A capability gate in front of every external call
//! - Handler errors outside the protocol taxonomy coerced into server errors
//! - Built-in introspection procedures (`system.listMethods`, `system.describe`, `ping`)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use kapu_rpc_lib::protocol::jsonrpc::{create_engine, AllowAll, ParamSpec, Params, ProcedureDescriptor};
//! use serde_json::{json, Value};
//!
//! let add = ProcedureDescriptor::new("add", |params: Params| async move {
//!     let a = params.get("a").and_then(Value::as_i64).unwrap_or_default();
//!     let b = params.get("b").and_then(Value::as_i64).unwrap_or_default();
//!     Ok(json!(a + b))
//! })
//! .with_params(ParamSpec::named([("a", "int"), ("b", "int")]));
//!
//! let engine = create_engine(vec![add], Arc::new(AllowAll)).unwrap();
//!
//! let response = tokio_test::block_on(
//!     engine.handle(br#"{"jsonrpc":"2.0","method":"add","params":{"a":1,"b":2},"id":1}"#),
//! );
//! assert_eq!(response.as_deref(), Some(r#"{"jsonrpc":"2.0","result":3,"id":1}"#));
//!
//! // Notifications produce no output.
//! let response = tokio_test::block_on(engine.handle(br#"{"jsonrpc":"2.0","method":"ping"}"#));
//! assert!(response.is_none());
//! ```

pub mod decode;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod methods;
pub mod params;
pub mod registry;
pub mod response;
pub mod setup;
pub mod typecheck;
pub mod types;
pub mod validation;

#[cfg(test)]
mod tests;

// Re-exports
pub use decode::{decode, decode_with_limit, Decoded};
pub use dispatch::{AllowAll, Authorizer, CapabilitySet, Dispatcher};
pub use engine::{Engine, Reply, DEFAULT_MAX_BATCH_SIZE, TRANSPORT_STATUS_OK};
pub use error::{ErrorKind, ErrorObject, ProtocolError, Result};
pub use methods::{MethodCatalog, MethodInfo};
pub use params::{validate_params, ParamSpec};
pub use registry::{
    ProcedureDescriptor, ProcedureFuture, ProcedureHandler, ProcedureRegistry, ProcedureResult,
    RegistryBuilder,
};
pub use response::{build_error, build_success, coerce};
pub use setup::{build_registry, create_engine, create_engine_from_config};
pub use typecheck::{TypeExpr, ValueKind};
pub use types::{Call, Id, Params, Response, JSONRPC_VERSION};
pub use validation::validate_request;
