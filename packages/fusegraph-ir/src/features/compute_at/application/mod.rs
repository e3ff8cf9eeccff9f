//! Compute-at map and its diagnostics

pub mod compute_at_map;
pub mod dump;

pub use compute_at_map::{ComputeAtMap, ComputeAtStats};
pub use dump::{ComputeAtMapDisplay, ComputeAtSnapshot};
