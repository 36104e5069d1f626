//! Error module for the Kapu RPC engine.
//!
//! This module provides the error handling framework for everything outside the
//! wire-level JSON-RPC taxonomy: configuration, registry construction, transport
//! I/O, and the reporting of procedure failures that are hidden from callers.
//!
//! Wire-level errors live in [`crate::protocol::jsonrpc::error`].

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::protocol::jsonrpc::ProtocolError;

pub mod config;
pub mod registry;
pub mod transport;

/// Result type alias used throughout the Kapu RPC engine.
pub type KapuResult<T> = Result<T, KapuError>;

/// Core error enum for the Kapu RPC engine.
#[derive(Error, Debug)]
pub enum KapuError {
    /// Errors occurring during configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Errors occurring while building the procedure registry.
    #[error("Registry error: {0}")]
    Registry(#[from] registry::RegistryError),

    /// Errors related to the transport carrying request bodies.
    #[error("Transport error: {0}")]
    Transport(#[from] transport::TransportError),

    /// A JSON-RPC protocol error raised outside a request entry.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A procedure handler failed with an error outside the protocol taxonomy.
    #[error("Procedure handler error: {0:#}")]
    Handler(anyhow::Error),

    /// IO errors that may occur during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/Deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Custom error with message for cases where specific error types are not defined.
    #[error("{0}")]
    Custom(String),
}

/// Error reporting structure to provide context and debugging information.
#[derive(Debug)]
pub struct ErrorContext {
    /// The original error that occurred.
    pub error: KapuError,

    /// The component where the error occurred.
    pub component: String,

    /// Additional context information to help with debugging.
    pub details: Option<String>,

    /// Span trace captured where the error was reported.
    pub trace: Option<String>,
}

impl ErrorContext {
    /// Creates a new error context with the given error and component.
    ///
    /// # Arguments
    ///
    /// * `error` - The error that occurred
    /// * `component` - The component where the error occurred
    pub fn new<S: Into<String>>(error: KapuError, component: S) -> Self {
        Self {
            error,
            component: component.into(),
            details: None,
            trace: None,
        }
    }

    /// Adds detail information to the error context.
    pub fn with_details<S: Into<String>>(mut self, details: S) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Adds trace information to the error context.
    pub fn with_trace<S: Into<String>>(mut self, trace: S) -> Self {
        self.trace = Some(trace.into());
        self
    }

    /// Captures the current `tracing` span trace into the context.
    ///
    /// The trace is empty unless the subscriber has a
    /// [`tracing_error::ErrorLayer`] installed.
    pub fn with_span_trace(self) -> Self {
        let trace = tracing_error::SpanTrace::capture().to_string();
        if trace.is_empty() {
            self
        } else {
            self.with_trace(trace)
        }
    }
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error in {}: {}", self.component, self.error)?;
        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }
        Ok(())
    }
}

/// Error reporter trait for reporting errors to various sinks.
pub trait ErrorReporter: Send + Sync + std::fmt::Debug {
    /// Report an error with context.
    fn report(&self, context: ErrorContext);
}

/// Error reporter that logs errors using the tracing framework.
#[derive(Default, Debug)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, context: ErrorContext) {
        tracing::error!(
            error = %context.error,
            component = %context.component,
            details = context.details.as_deref().unwrap_or("None"),
            trace = context.trace.as_deref().unwrap_or("None"),
            "Error reported"
        );
    }
}

/// Global error reporter accessor.
#[derive(Debug, Default)]
pub struct ErrorReporting {
    reporter: OnceCell<Arc<dyn ErrorReporter>>,
}

impl ErrorReporting {
    const fn new() -> Self {
        Self {
            reporter: OnceCell::new(),
        }
    }

    /// Installs the reporter. Only the first installation takes effect.
    ///
    /// Returns `false` if a reporter was already installed.
    pub fn set_reporter(&self, reporter: Arc<dyn ErrorReporter>) -> bool {
        self.reporter.set(reporter).is_ok()
    }

    /// Report an error with context.
    ///
    /// Falls back to [`TracingErrorReporter`] when no reporter is installed.
    pub fn report(&self, context: ErrorContext) {
        match self.reporter.get() {
            Some(reporter) => reporter.report(context),
            None => TracingErrorReporter.report(context),
        }
    }
}

static ERROR_REPORTING: ErrorReporting = ErrorReporting::new();

/// Get the global error reporting instance.
pub fn get_error_reporting() -> &'static ErrorReporting {
    &ERROR_REPORTING
}

/// Set the global error reporter.
///
/// Returns `false` if a reporter was already installed.
pub fn set_error_reporter(reporter: Arc<dyn ErrorReporter>) -> bool {
    ERROR_REPORTING.set_reporter(reporter)
}
