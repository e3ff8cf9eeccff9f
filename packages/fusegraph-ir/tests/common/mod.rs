//! Common test utilities for fusegraph-ir
//!
//! Shared fusion fixtures and mapping assertions for integration tests.

#![allow(dead_code)]

mod assertions;
mod fixtures;

// Re-export all utilities
pub use assertions::*;
pub use fixtures::*;
