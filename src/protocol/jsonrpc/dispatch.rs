// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Method dispatch behind the authorization gate.
//!
//! The dispatcher resolves a method name to its descriptor, asks the
//! [`Authorizer`] whether the caller holds the descriptor's capability, and
//! invokes the handler. A denied call fails exactly like an unknown method.
//! A panicking handler is caught and answered as a server error.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, warn};

use super::error::ProtocolError;
use super::registry::{ProcedureRegistry, ProcedureResult};
use super::types::Params;
use crate::error::{get_error_reporting, ErrorContext, KapuError};

/// Capability check consulted before every external call.
pub trait Authorizer: Send + Sync {
    /// Returns true if the caller may use a procedure requiring `access`.
    ///
    /// `None` means the procedure declares no requirement.
    fn authorized(&self, access: Option<&str>) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(Option<&str>) -> bool + Send + Sync,
{
    fn authorized(&self, access: Option<&str>) -> bool {
        (self)(access)
    }
}

/// Authorizer that grants every capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorized(&self, _access: Option<&str>) -> bool {
        true
    }
}

/// Authorizer backed by a fixed set of granted capability tokens.
///
/// Procedures without a requirement are always allowed.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    granted: HashSet<String>,
}

impl CapabilitySet {
    /// Creates a set from granted tokens.
    pub fn new<I, S>(granted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            granted: granted.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the token was granted.
    pub fn contains(&self, token: &str) -> bool {
        self.granted.contains(token)
    }
}

impl Authorizer for CapabilitySet {
    fn authorized(&self, access: Option<&str>) -> bool {
        access.map_or(true, |token| self.granted.contains(token))
    }
}

/// Routes calls to registered handlers.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ProcedureRegistry>,
    authorizer: Arc<dyn Authorizer>,
}

impl Dispatcher {
    /// Creates a dispatcher over a registry and an authorizer.
    pub fn new(registry: Arc<ProcedureRegistry>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            registry,
            authorizer,
        }
    }

    /// Returns the registry.
    pub fn registry(&self) -> &ProcedureRegistry {
        &self.registry
    }

    /// Invokes `method` with `params`.
    ///
    /// Internal calls skip the authorization gate. Handler errors are returned
    /// unmodified. A panic inside the handler becomes a server error carrying
    /// the panic message.
    pub async fn call(&self, method: &str, params: Params, internal: bool) -> ProcedureResult {
        let descriptor = self
            .registry
            .get(method)
            .ok_or_else(ProtocolError::method_not_found)?;
        let handler = descriptor
            .handler()
            .ok_or_else(ProtocolError::method_not_found)?;

        if !internal && !self.authorizer.authorized(descriptor.access()) {
            warn!(method, access = descriptor.access(), "Call denied by authorizer");
            return Err(ProtocolError::method_not_found().into());
        }

        debug!(method, internal, "Dispatching call");
        let invocation = async move { handler.call(params).await };
        match AssertUnwindSafe(invocation).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(method, panic_msg = %message, "Procedure panicked");
                get_error_reporting().report(
                    ErrorContext::new(
                        KapuError::Custom(format!("Procedure {method} panicked: {message}")),
                        "jsonrpc::dispatch",
                    )
                    .with_span_trace(),
                );
                Err(ProtocolError::server_error(message).into())
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
