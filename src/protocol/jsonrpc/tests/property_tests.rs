// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Property-based tests for the JSON-RPC 2.0 engine.
//! These tests check the answering rules and the type grammar against
//! randomly generated payloads.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use crate::protocol::jsonrpc::typecheck::matches;
use crate::protocol::jsonrpc::{create_engine, AllowAll, Engine, ProcedureDescriptor};

// Generate a method name, registered or not
fn method_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("echo".to_string()),
        Just("fail".to_string()),
        "[a-z][a-z0-9_]{1,12}".prop_map(|name| format!("unknown_{name}")),
    ]
}

// Generate an id member: absent, null, number, or string
fn id_strategy() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(Value::Null)),
        any::<i32>().prop_map(|n| Some(json!(n))),
        "[a-zA-Z0-9_-]{1,10}".prop_map(|s| Some(json!(s))),
    ]
}

// Generate one batch entry, valid or structurally broken
fn entry_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => (method_strategy(), id_strategy()).prop_map(|(method, id)| {
            let mut entry = Map::new();
            entry.insert("jsonrpc".to_string(), json!("2.0"));
            entry.insert("method".to_string(), json!(method));
            if let Some(id) = id {
                entry.insert("id".to_string(), id);
            }
            Value::Object(entry)
        }),
        1 => Just(json!({"jsonrpc": "1.0", "method": "echo", "id": 1})),
        1 => any::<i64>().prop_map(|n| json!(n)),
        1 => Just(json!({})),
    ]
}

// Generate an arbitrary JSON value of bounded depth
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
        "[a-zA-Z0-9 ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

const KNOWN_BASES: [&str; 15] = [
    "any", "array", "bool", "boolean", "int", "integer", "float", "double", "numeric", "str",
    "string", "alpha", "alnum", "scalar", "null",
];

fn engine() -> Engine {
    create_engine(
        vec![
            ProcedureDescriptor::new("echo", |_| async { Ok(json!("echoed")) }),
            ProcedureDescriptor::new("fail", |_| async { Err(anyhow::anyhow!("boom")) }),
        ],
        Arc::new(AllowAll),
    )
    .unwrap()
}

// An entry is answered iff it carries an id member or is not a valid request
fn expects_answer(entry: &Value) -> bool {
    match entry.as_object() {
        Some(object) if !object.is_empty() => {
            object.contains_key("id") || object.get("jsonrpc") != Some(&json!("2.0"))
        }
        _ => true,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn batch_answers_exactly_the_expected_entries(entries in prop::collection::vec(entry_strategy(), 1..12)) {
        let engine = engine();
        let body = serde_json::to_vec(&entries).unwrap();
        let output = tokio_test::block_on(engine.handle(&body));

        let expected: Vec<&Value> = entries.iter().filter(|e| expects_answer(e)).collect();
        match output {
            None => prop_assert!(expected.is_empty()),
            Some(encoded) => {
                let responses: Vec<Value> = serde_json::from_str(&encoded).unwrap();
                prop_assert_eq!(responses.len(), expected.len());

                for (response, entry) in responses.iter().zip(expected) {
                    prop_assert_eq!(&response["id"], entry.get("id").unwrap_or(&Value::Null));
                    prop_assert!(response.get("result").is_some() != response.get("error").is_some());
                }
            }
        }
    }

    #[test]
    fn single_request_echoes_its_id(method in method_strategy(), id in id_strategy()) {
        let engine = engine();
        let mut entry = json!({"jsonrpc": "2.0", "method": method});
        if let Some(id) = &id {
            entry["id"] = id.clone();
        }
        let body = serde_json::to_vec(&entry).unwrap();
        let output = tokio_test::block_on(engine.handle(&body));

        match id {
            None => prop_assert!(output.is_none()),
            Some(id) => {
                let response: Value = serde_json::from_str(&output.unwrap()).unwrap();
                prop_assert_eq!(&response["jsonrpc"], &json!("2.0"));
                prop_assert_eq!(&response["id"], &id);
            }
        }
    }

    #[test]
    fn garbage_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let engine = engine();
        let output = tokio_test::block_on(engine.handle(&bytes));
        if let Some(encoded) = output {
            let response: Value = serde_json::from_str(&encoded).unwrap();
            prop_assert!(response.is_object() || response.is_array());
        }
    }

    #[test]
    fn any_accepts_everything(value in value_strategy()) {
        prop_assert!(matches(&value, "any"));
        prop_assert!(matches(&value, "?any"));
    }

    #[test]
    fn nullable_accepts_null_and_the_base_type(value in value_strategy(), base in prop::sample::select(vec!["int", "str", "bool", "float", "array", "scalar", "numeric", "str[]"])) {
        let nullable = format!("?{base}");
        prop_assert!(matches(&Value::Null, &nullable));
        if matches(&value, base) {
            prop_assert!(matches(&value, &nullable));
        }
    }

    #[test]
    fn unknown_base_names_reject_everything(value in value_strategy(), name in "[a-z]{3,8}") {
        prop_assume!(!KNOWN_BASES.contains(&name.as_str()));
        prop_assert!(!matches(&value, &name));
    }

    #[test]
    fn typed_list_checks_every_element(items in prop::collection::vec(any::<i64>(), 0..8)) {
        let list = json!(items);
        prop_assert!(matches(&list, "int[]"));
        prop_assert!(!matches(&list, "str[]") || items.is_empty());
    }
}
