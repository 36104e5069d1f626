//! Kapu RPC Library
//!
//! This library contains a JSON-RPC 2.0 engine: payload decoding, request
//! validation, typed parameter specifications, capability-gated dispatch,
//! and response building, plus the configuration and transports used to
//! serve it. The binary crate serves the engine over stdio; other projects
//! embed it by registering their own procedures.
//!
//! # Architecture
//!
//! - An immutable procedure registry, built once and shared
//! - Dependency injection of the authorizer and transport for testability
//! - Per-entry error isolation inside batches
//! - Async handlers driven by tokio

// Re-export public modules
pub mod config;
pub mod error;
pub mod protocol;
pub mod transport;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

/// Version information for Kapu RPC.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library initialization function.
///
/// Installs the tracing-backed error reporter unless another reporter was
/// installed first.
pub fn init() {
    let reporter = std::sync::Arc::new(error::TracingErrorReporter);
    if !error::set_error_reporter(reporter) {
        tracing::debug!("Error reporter already installed");
    }
}
