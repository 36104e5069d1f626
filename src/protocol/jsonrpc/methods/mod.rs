// Copyright (c) 2025 Kapu RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Built-in procedures served by every engine.

pub mod system;

// Re-exports
pub use system::{system_procedures, MethodCatalog, MethodInfo};
