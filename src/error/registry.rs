//! Registry error module.
//!
//! Errors raised while assembling the immutable procedure registry.

use thiserror::Error;

/// Errors that can occur while building a procedure registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two descriptors declared the same method name.
    #[error("Duplicate procedure method: {0}")]
    DuplicateMethod(String),

    /// A descriptor was declared with an empty method name.
    #[error("Procedure method name cannot be empty")]
    EmptyMethodName,
}
