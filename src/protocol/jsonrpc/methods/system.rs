// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Introspection procedures.
//!
//! - `system.listMethods` returns the methods the caller may use.
//! - `system.describe` returns the access requirement and param spec of one method.
//! - `ping` returns `"pong"`.
//!
//! Both introspection procedures apply the same authorizer as dispatch, so a
//! method the caller cannot use is neither listed nor describable.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::{json, Value};

use crate::protocol::jsonrpc::dispatch::Authorizer;
use crate::protocol::jsonrpc::error::ProtocolError;
use crate::protocol::jsonrpc::params::ParamSpec;
use crate::protocol::jsonrpc::registry::{ProcedureDescriptor, ProcedureRegistry, ProcedureResult};
use crate::protocol::jsonrpc::types::Params;

/// Public description of one procedure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodInfo {
    /// Method name
    pub method: String,

    /// Capability token required to call the method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,

    /// Declared params
    pub params: ParamSpec,
}

impl From<&ProcedureDescriptor> for MethodInfo {
    fn from(descriptor: &ProcedureDescriptor) -> Self {
        Self {
            method: descriptor.method().to_string(),
            access: descriptor.access().map(str::to_string),
            params: descriptor.params().clone(),
        }
    }
}

/// Snapshot of the registry as seen through an authorizer.
pub struct MethodCatalog {
    methods: Vec<MethodInfo>,
    authorizer: Arc<dyn Authorizer>,
}

impl MethodCatalog {
    /// Captures every bound procedure of `registry`.
    pub fn from_registry(registry: &ProcedureRegistry, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            methods: registry
                .iter()
                .filter(|d| d.handler().is_some())
                .map(MethodInfo::from)
                .collect(),
            authorizer,
        }
    }

    /// Iterates over the methods the authorizer lets the caller use.
    pub fn visible(&self) -> impl Iterator<Item = &MethodInfo> {
        self.methods
            .iter()
            .filter(|info| self.authorizer.authorized(info.access.as_deref()))
    }

    /// Finds a visible method by name.
    pub fn find(&self, method: &str) -> Option<&MethodInfo> {
        self.visible().find(|info| info.method == method)
    }
}

/// Shared slot the introspection procedures read the catalog from.
///
/// The catalog can only be captured once the registry holding these
/// procedures has been built.
pub type CatalogSlot = Arc<OnceCell<MethodCatalog>>;

/// Returns the built-in procedure descriptors.
pub fn system_procedures(catalog: CatalogSlot) -> Vec<ProcedureDescriptor> {
    let list_catalog = catalog.clone();
    let describe_catalog = catalog;

    vec![
        ProcedureDescriptor::new("system.listMethods", move |_params: Params| {
            let catalog = list_catalog.clone();
            async move { list_methods(&catalog) }
        }),
        ProcedureDescriptor::new("system.describe", move |params: Params| {
            let catalog = describe_catalog.clone();
            async move { describe(&catalog, &params) }
        })
        .with_params(ParamSpec::named([("method", "str")])),
        ProcedureDescriptor::new("ping", |_params: Params| async { Ok(json!("pong")) }),
    ]
}

fn ready(catalog: &CatalogSlot) -> Result<&MethodCatalog, ProtocolError> {
    catalog
        .get()
        .ok_or_else(|| ProtocolError::server_error("Method catalog is not available"))
}

fn list_methods(catalog: &CatalogSlot) -> ProcedureResult {
    let names: Vec<&str> = ready(catalog)?
        .visible()
        .map(|info| info.method.as_str())
        .collect();
    Ok(json!(names))
}

fn describe(catalog: &CatalogSlot, params: &Params) -> ProcedureResult {
    let method = params.get("method").and_then(Value::as_str).unwrap_or_default();
    let info = ready(catalog)?
        .find(method)
        .ok_or_else(ProtocolError::method_not_found)?;
    Ok(serde_json::to_value(info)?)
}
