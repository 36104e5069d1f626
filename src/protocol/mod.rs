//! Protocol module for the Kapu RPC engine.
//!
//! This module implements JSON-RPC 2.0 handling: payload decoding, request
//! validation, param checking, authorization and dispatch.

pub mod jsonrpc;
