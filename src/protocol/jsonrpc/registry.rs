// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Procedure descriptors and the immutable registry that indexes them.
//!
//! The registry is built once, keeps declaration order, and is looked up by
//! method name for every call. It is never mutated after [`RegistryBuilder::build`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use fnv::FnvHashMap;
use futures::future::BoxFuture;
use serde_json::Value;

use super::params::ParamSpec;
use super::types::Params;
use crate::error::registry::RegistryError;

/// Outcome of a procedure handler.
///
/// Handlers return a [`ProtocolError`](super::ProtocolError) inside the
/// `anyhow::Error` to choose the emitted code; any other error is reported
/// to the caller as a server error with its message only.
pub type ProcedureResult = Result<Value, anyhow::Error>;

/// Type alias for a handler's future.
pub type ProcedureFuture = BoxFuture<'static, ProcedureResult>;

/// A procedure implementation.
pub trait ProcedureHandler: Send + Sync {
    /// Invokes the procedure with already validated params.
    fn call(&self, params: Params) -> ProcedureFuture;
}

impl<F, Fut> ProcedureHandler for F
where
    F: Fn(Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProcedureResult> + Send + 'static,
{
    fn call(&self, params: Params) -> ProcedureFuture {
        Box::pin((self)(params))
    }
}

/// Registry record binding a method name to its handler, access requirement,
/// and parameter spec.
#[derive(Clone)]
pub struct ProcedureDescriptor {
    method: String,
    handler: Option<Arc<dyn ProcedureHandler>>,
    access: Option<String>,
    params: ParamSpec,
}

impl ProcedureDescriptor {
    /// Creates a public descriptor with no declared params.
    pub fn new<F, Fut>(method: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProcedureResult> + Send + 'static,
    {
        Self::from_handler(method, Arc::new(handler))
    }

    /// Creates a public descriptor around an existing handler object.
    pub fn from_handler(method: impl Into<String>, handler: Arc<dyn ProcedureHandler>) -> Self {
        Self {
            method: method.into(),
            handler: Some(handler),
            access: None,
            params: ParamSpec::none(),
        }
    }

    /// Creates a descriptor that has no handler bound.
    ///
    /// Calls to such a method fail as if it did not exist.
    pub fn unbound(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            handler: None,
            access: None,
            params: ParamSpec::none(),
        }
    }

    /// Sets the capability token required to call this procedure.
    pub fn with_access(mut self, access: impl Into<String>) -> Self {
        self.access = Some(access.into());
        self
    }

    /// Sets the parameter spec.
    pub fn with_params(mut self, params: ParamSpec) -> Self {
        self.params = params;
        self
    }

    /// Returns the method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the handler, if bound.
    pub fn handler(&self) -> Option<&Arc<dyn ProcedureHandler>> {
        self.handler.as_ref()
    }

    /// Returns the required capability token, if any.
    pub fn access(&self) -> Option<&str> {
        self.access.as_deref()
    }

    /// Returns the parameter spec.
    pub fn params(&self) -> &ParamSpec {
        &self.params
    }
}

impl fmt::Debug for ProcedureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureDescriptor")
            .field("method", &self.method)
            .field("handler", &self.handler.as_ref().map(|_| "<handler>"))
            .field("access", &self.access)
            .field("params", &self.params)
            .finish()
    }
}

/// Ordered, immutable collection of procedures indexed by method name.
#[derive(Debug, Default)]
pub struct ProcedureRegistry {
    procedures: Vec<ProcedureDescriptor>,
    index: FnvHashMap<String, usize>,
}

impl ProcedureRegistry {
    /// Starts building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Looks up a procedure by method name.
    pub fn get(&self, method: &str) -> Option<&ProcedureDescriptor> {
        self.index.get(method).map(|&i| &self.procedures[i])
    }

    /// Returns true if the method is registered.
    pub fn contains(&self, method: &str) -> bool {
        self.index.contains_key(method)
    }

    /// Iterates over procedures in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ProcedureDescriptor> {
        self.procedures.iter()
    }

    /// Returns the number of registered procedures.
    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    /// Returns true if no procedure is registered.
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}

/// Collects descriptors and validates them into a [`ProcedureRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    procedures: Vec<ProcedureDescriptor>,
}

impl RegistryBuilder {
    /// Adds a procedure.
    pub fn register(mut self, descriptor: ProcedureDescriptor) -> Self {
        self.procedures.push(descriptor);
        self
    }

    /// Adds several procedures.
    pub fn register_all<I>(mut self, descriptors: I) -> Self
    where
        I: IntoIterator<Item = ProcedureDescriptor>,
    {
        self.procedures.extend(descriptors);
        self
    }

    /// Builds the registry.
    ///
    /// Fails if a method name is empty or declared twice.
    pub fn build(self) -> Result<ProcedureRegistry, RegistryError> {
        let mut index = FnvHashMap::default();

        for (position, descriptor) in self.procedures.iter().enumerate() {
            if descriptor.method.is_empty() {
                return Err(RegistryError::EmptyMethodName);
            }
            if index.insert(descriptor.method.clone(), position).is_some() {
                return Err(RegistryError::DuplicateMethod(descriptor.method.clone()));
            }
        }

        tracing::debug!(procedures = self.procedures.len(), "Procedure registry built");

        Ok(ProcedureRegistry {
            procedures: self.procedures,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn echo(params: Params) -> ProcedureResult {
        Ok(params.to_value())
    }

    #[test]
    fn test_registry_lookup_and_order() {
        let registry = ProcedureRegistry::builder()
            .register(ProcedureDescriptor::new("b", echo))
            .register(ProcedureDescriptor::new("a", echo).with_access("admin"))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("a"));
        assert!(!registry.contains("c"));
        assert_eq!(registry.get("a").unwrap().access(), Some("admin"));
        assert_eq!(registry.get("b").unwrap().access(), None);

        let methods: Vec<&str> = registry.iter().map(ProcedureDescriptor::method).collect();
        assert_eq!(methods, vec!["b", "a"]);
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let error = ProcedureRegistry::builder()
            .register(ProcedureDescriptor::new("a", echo))
            .register(ProcedureDescriptor::unbound("a"))
            .build()
            .unwrap_err();
        assert_eq!(error, RegistryError::DuplicateMethod("a".to_string()));
    }

    #[test]
    fn test_registry_rejects_empty_method() {
        let error = ProcedureRegistry::builder()
            .register(ProcedureDescriptor::unbound(""))
            .build()
            .unwrap_err();
        assert_eq!(error, RegistryError::EmptyMethodName);
    }

    #[test]
    fn test_unbound_descriptor() {
        let descriptor = ProcedureDescriptor::unbound("reserved");
        assert!(descriptor.handler().is_none());
        assert!(format!("{descriptor:?}").contains("reserved"));
    }

    #[tokio::test]
    async fn test_closure_handler() {
        let descriptor = ProcedureDescriptor::new("double", |params: Params| async move {
            let n = params.get("0").and_then(Value::as_i64).unwrap_or_default();
            Ok(json!(n * 2))
        });

        let result = descriptor
            .handler()
            .unwrap()
            .call(Params::from(json!([21])))
            .await
            .unwrap();
        assert_eq!(result, json!(42));
    }
}
