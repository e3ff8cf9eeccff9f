//! Shared module - Common types and utilities
//!
//! This module contains types that are shared across all features.

#[macro_use]
pub mod macros;
pub mod models;

// Re-exports for convenience
pub use models::*;
