// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Setup and initialization utilities for the engine.
//!
//! These functions assemble a registry from caller-supplied procedures plus
//! the built-in ones, and wire it to an authorizer.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::KapuConfig;
use crate::error::registry::RegistryError;
use crate::protocol::jsonrpc::dispatch::{AllowAll, Authorizer, CapabilitySet};
use crate::protocol::jsonrpc::engine::Engine;
use crate::protocol::jsonrpc::methods::{system_procedures, MethodCatalog};
use crate::protocol::jsonrpc::registry::{ProcedureDescriptor, ProcedureRegistry};

/// Builds a registry holding the built-in procedures followed by `procedures`.
///
/// The introspection procedures see the registry through `authorizer`.
pub fn build_registry<I>(
    procedures: I,
    authorizer: Arc<dyn Authorizer>,
) -> Result<ProcedureRegistry, RegistryError>
where
    I: IntoIterator<Item = ProcedureDescriptor>,
{
    let catalog = Arc::new(OnceCell::new());
    let registry = ProcedureRegistry::builder()
        .register_all(system_procedures(catalog.clone()))
        .register_all(procedures)
        .build()?;

    if catalog
        .set(MethodCatalog::from_registry(&registry, authorizer))
        .is_err()
    {
        tracing::warn!("Method catalog was already filled, keeping the existing one");
    }

    Ok(registry)
}

/// Creates an engine serving the built-in procedures and `procedures`.
pub fn create_engine<I>(
    procedures: I,
    authorizer: Arc<dyn Authorizer>,
) -> Result<Engine, RegistryError>
where
    I: IntoIterator<Item = ProcedureDescriptor>,
{
    let registry = build_registry(procedures, authorizer.clone())?;
    Ok(Engine::new(registry, authorizer))
}

/// Creates an engine configured from `config`.
///
/// The caller is granted the capabilities listed in `security.granted_capabilities`
/// (or all of them with `security.allow_unrestricted`). Batches are bounded
/// by `limits.max_batch_size`.
pub fn create_engine_from_config<I>(
    config: &KapuConfig,
    procedures: I,
) -> Result<Engine, RegistryError>
where
    I: IntoIterator<Item = ProcedureDescriptor>,
{
    let authorizer: Arc<dyn Authorizer> = if config.security.allow_unrestricted {
        Arc::new(AllowAll)
    } else {
        Arc::new(CapabilitySet::new(
            config.security.granted_capabilities.iter().cloned(),
        ))
    };
    Ok(create_engine(procedures, authorizer)?.with_max_batch_size(config.limits.max_batch_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::jsonrpc::types::{Id, Params, Response};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_ping_registered() {
        let engine = create_engine(Vec::new(), Arc::new(AllowAll)).unwrap();
        let body = engine
            .handle(br#"{"jsonrpc":"2.0","method":"ping","id":1}"#)
            .await
            .unwrap();

        let response: Response = serde_json::from_str(&body).unwrap();
        assert_eq!(response.id, Id::from(1));
        assert_eq!(response.result, Some(json!("pong")));
    }

    #[tokio::test]
    async fn test_list_methods_includes_user_procedures() {
        let engine = create_engine(
            vec![ProcedureDescriptor::new("echo", |params: Params| async move {
                Ok(params.to_value())
            })],
            Arc::new(AllowAll),
        )
        .unwrap();

        let body = engine
            .handle(br#"{"jsonrpc":"2.0","method":"system.listMethods","id":"l"}"#)
            .await
            .unwrap();
        let response: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            response["result"],
            json!(["system.listMethods", "system.describe", "ping", "echo"])
        );
    }

    #[test]
    fn test_user_procedure_cannot_shadow_builtin() {
        let result = build_registry(
            vec![ProcedureDescriptor::unbound("ping")],
            Arc::new(AllowAll),
        );
        assert_eq!(
            result.unwrap_err(),
            RegistryError::DuplicateMethod("ping".to_string())
        );
    }

    #[tokio::test]
    async fn test_engine_from_config_applies_grants_and_limits() {
        let mut config = KapuConfig::default();
        config.security.granted_capabilities = vec!["ops".to_string()];
        config.limits.max_batch_size = 2;

        let engine = create_engine_from_config(
            &config,
            vec![
                ProcedureDescriptor::new("ops.status", |_| async { Ok(json!("green")) })
                    .with_access("ops"),
                ProcedureDescriptor::new("root.wipe", |_| async { Ok(json!("gone")) })
                    .with_access("root"),
            ],
        )
        .unwrap();

        let body = engine
            .handle(br#"[{"jsonrpc":"2.0","method":"ops.status","id":1},{"jsonrpc":"2.0","method":"root.wipe","id":2}]"#)
            .await
            .unwrap();
        let responses: Vec<Response> = serde_json::from_str(&body).unwrap();
        assert_eq!(responses[0].result, Some(json!("green")));
        assert_eq!(responses[1].error.as_ref().map(|e| e.code), Some(-32601));

        let body = engine
            .handle(br#"[{"jsonrpc":"2.0","method":"ping","id":1},{"jsonrpc":"2.0","method":"ping","id":2},{"jsonrpc":"2.0","method":"ping","id":3}]"#)
            .await
            .unwrap();
        let response: Response = serde_json::from_str(&body).unwrap();
        assert_eq!(response.error.map(|e| e.code), Some(-32600));
    }

    #[tokio::test]
    async fn test_unrestricted_config_grants_everything() {
        let mut config = KapuConfig::default();
        config.security.allow_unrestricted = true;

        let engine = create_engine_from_config(
            &config,
            vec![ProcedureDescriptor::new("root.wipe", |_| async { Ok(json!("gone")) })
                .with_access("root")],
        )
        .unwrap();

        let result = engine
            .handle(br#"{"jsonrpc":"2.0","method":"root.wipe","id":1}"#)
            .await
            .unwrap();
        assert_eq!(result, r#"{"jsonrpc":"2.0","result":"gone","id":1}"#);
    }
}
