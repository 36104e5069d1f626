//! Test modules for Kapu RPC.
//!
//! This module contains crate-wide testing infrastructure:
//! - Configuration loading and validation tests
//! - Error type and error reporting tests
//! - Shared fixtures and proptest strategies
//!
//! Protocol suites live next to the protocol code in
//! `protocol::jsonrpc::tests`.


// Re-export commonly used testing tools to simplify imports in test modules
pub use test_utils::{jsonrpc_method_strategy, request_strategy, type_expr_strategy, TestFixture};
