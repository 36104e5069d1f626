//! Kapu RPC Benchmarks
//!
//! Benchmarks for the engine's hot paths: type-expression checks, param
//! validation, and end-to-end handling of single and batch payloads.
//! The benchmarks are implemented using the Criterion framework.
//!
//! To run the benchmarks:
//! ```bash
//! cargo bench --features benchmarking
//! ```

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kapu_rpc_lib::protocol::jsonrpc::params::check_spec;
use kapu_rpc_lib::protocol::jsonrpc::typecheck::matches;
use kapu_rpc_lib::protocol::jsonrpc::{
    create_engine, AllowAll, Engine, ParamSpec, Params, ProcedureDescriptor,
};
use serde_json::{json, Value};

fn engine() -> Engine {
    create_engine(
        vec![ProcedureDescriptor::new("add", |params: Params| async move {
            let a = params.get("a").and_then(Value::as_i64).unwrap_or_default();
            let b = params.get("b").and_then(Value::as_i64).unwrap_or_default();
            Ok(json!(a + b))
        })
        .with_params(ParamSpec::named([("a", "int"), ("b", "int")]))],
        Arc::new(AllowAll),
    )
    .expect("benchmark engine builds")
}

fn batch_body(size: usize) -> Vec<u8> {
    let entries: Vec<Value> = (0..size)
        .map(|i| json!({"jsonrpc": "2.0", "method": "add", "params": {"a": i, "b": 1}, "id": i}))
        .collect();
    serde_json::to_vec(&entries).expect("batch encodes")
}

/// Benchmark the type-expression checker
fn bench_typecheck(c: &mut Criterion) {
    let mut group = c.benchmark_group("typecheck");

    let cases = [
        ("int", json!(42)),
        ("?str", Value::Null),
        ("numeric", json!(" 1.5e3")),
        ("alnum", json!("abc123XYZ")),
        ("int[][]", json!([[1, 2, 3], [4, 5, 6], [7, 8, 9]])),
    ];
    for (expr, value) in &cases {
        group.bench_with_input(BenchmarkId::new("matches", expr), value, |b, value| {
            b.iter(|| matches(black_box(value), black_box(expr)))
        });
    }

    let spec = ParamSpec::named([("name", "str"), ("age", "?int"), ("tags", "str[]")]);
    let params = Params::from(json!({"name": "Ada", "age": 36, "tags": ["math", "engines"]}));
    group.bench_function("check_spec_named", |b| {
        b.iter(|| check_spec(black_box(&spec), black_box(&params)))
    });

    group.finish();
}

/// Benchmark end-to-end payload handling
fn bench_engine(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime builds");
    let engine = engine();

    let mut group = c.benchmark_group("engine");
    group.measurement_time(Duration::from_secs(3));

    let single = br#"{"jsonrpc":"2.0","method":"add","params":{"a":1,"b":2},"id":1}"#;
    group.bench_function("single", |b| {
        b.iter(|| runtime.block_on(engine.handle(black_box(single))))
    });

    let notification = br#"{"jsonrpc":"2.0","method":"add","params":{"a":1,"b":2}}"#;
    group.bench_function("notification", |b| {
        b.iter(|| runtime.block_on(engine.handle(black_box(notification))))
    });

    group.bench_function("parse_error", |b| {
        b.iter(|| runtime.block_on(engine.handle(black_box(b"{\"jsonrpc\""))))
    });

    for size in [1usize, 10, 100] {
        let body = batch_body(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("batch", size), &body, |b, body| {
            b.iter(|| runtime.block_on(engine.handle(black_box(body))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_typecheck, bench_engine);
criterion_main!(benches);
