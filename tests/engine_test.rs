// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Integration tests for the public engine API.
//! Builds an engine the way an embedding application would and drives it
//! through the in-memory transport.

use std::sync::Arc;

use kapu_rpc_lib::config::KapuConfig;
use kapu_rpc_lib::protocol::jsonrpc::{
    create_engine, create_engine_from_config, AllowAll, ParamSpec, Params, ProcedureDescriptor,
    ProtocolError, Response,
};
use kapu_rpc_lib::transport::MemoryTransport;
use serde_json::{json, Value};

fn greet(params: Params) -> impl std::future::Future<Output = anyhow::Result<Value>> {
    async move {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ProtocolError::invalid_params("name is required"))?;
        if name.eq_ignore_ascii_case("root") {
            return Err(ProtocolError::server_error("Reserved name")
                .with_code(-32010)
                .with_data(json!({"name": name}))
                .into());
        }
        Ok(json!(format!("Hello, {name}!")))
    }
}

fn procedures() -> Vec<ProcedureDescriptor> {
    vec![
        ProcedureDescriptor::new("greet", greet)
            .with_params(ParamSpec::named([("name", "alpha")])),
        ProcedureDescriptor::new("stats.tags", |params: Params| async move {
            let count = params.as_positional().map_or(0, <[Value]>::len);
            Ok(json!({ "count": count }))
        })
        .with_params(ParamSpec::whole("?str[]")),
        ProcedureDescriptor::new("admin.flush", |_| async { Ok(json!("flushed")) })
            .with_access("admin"),
    ]
}

#[tokio::test]
async fn test_embedded_engine_round_trip() {
    let engine = create_engine(procedures(), Arc::new(AllowAll)).expect("engine builds");

    let mut transport = MemoryTransport::with_messages([
        r#"{"jsonrpc":"2.0","method":"greet","params":{"name":"Ada"},"id":1}"#,
        r#"{"jsonrpc":"2.0","method":"greet","params":{"name":"Ada Lovelace"},"id":2}"#,
        r#"{"jsonrpc":"2.0","method":"greet","params":{"name":"root"},"id":3}"#,
        r#"{"jsonrpc":"2.0","method":"stats.tags","params":["a","b"],"id":4}"#,
        r#"{"jsonrpc":"2.0","method":"admin.flush","id":5}"#,
    ]);
    engine.serve(&mut transport).await.expect("transport stays healthy");

    let responses: Vec<Response> = transport
        .sent()
        .iter()
        .map(|body| serde_json::from_str(body).unwrap())
        .collect();
    assert_eq!(responses.len(), 5);

    assert_eq!(responses[0].result, Some(json!("Hello, Ada!")));

    let error = responses[1].error.as_ref().unwrap();
    assert_eq!(error.code, -32602);
    assert_eq!(error.message, "Unexpected type string for name, expected: alpha");

    let error = responses[2].error.as_ref().unwrap();
    assert_eq!(error.code, -32010);
    assert_eq!(error.data, Some(json!({"name": "root"})));

    assert_eq!(responses[3].result, Some(json!({"count": 2})));
    assert_eq!(responses[4].result, Some(json!("flushed")));
}

#[tokio::test]
async fn test_config_driven_engine_hides_admin() {
    let engine = create_engine_from_config(&KapuConfig::default(), procedures()).unwrap();

    let listed: Value = serde_json::from_str(
        &engine
            .handle(br#"{"jsonrpc":"2.0","method":"system.listMethods","id":1}"#)
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(
        listed["result"],
        json!(["system.listMethods", "system.describe", "ping", "greet", "stats.tags"])
    );

    let denied = engine
        .handle(br#"{"jsonrpc":"2.0","method":"admin.flush","id":2}"#)
        .await;
    let missing = engine
        .handle(br#"{"jsonrpc":"2.0","method":"admin.nothing","id":2}"#)
        .await;
    assert_eq!(denied, missing);

    let internal = engine.call_internal("admin.flush", Params::None).await.unwrap();
    assert_eq!(internal, json!("flushed"));
}

#[tokio::test]
async fn test_respond_reports_delivery() {
    let engine = create_engine(procedures(), Arc::new(AllowAll)).unwrap();

    let reply = engine
        .respond(br#"{"jsonrpc":"2.0","method":"greet","params":{"name":"Ada"}}"#)
        .await;
    assert_eq!(reply.status, 200);
    assert!(reply.body.is_empty());

    let reply = engine.respond(b"[]").await;
    assert_eq!(reply.status, 200);
    assert_eq!(
        reply.body,
        r#"{"jsonrpc":"2.0","error":{"code":-32600,"message":"Request is not a valid object"},"id":null}"#
    );
}
