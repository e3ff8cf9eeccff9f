//! Error types for fusegraph-ir
//!
//! Provides unified error handling across the crate. Every variant is an
//! internal-consistency failure: the caller aborts compilation on `Err`.

use crate::config::ConfigError;
use crate::features::compute_at::ComputeAtError;
use crate::features::fusion::FusionError;
use crate::features::transform_replay::ReplayError;
use thiserror::Error;

/// Main error type for fusegraph-ir operations
#[derive(Debug, Error)]
pub enum FusegraphError {
    /// Malformed or misused fusion model
    #[error("Fusion error: {0}")]
    Fusion(#[from] FusionError),

    /// Root mapping / replay failure
    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),

    /// Compute-at map construction or query failure
    #[error("Compute-at error: {0}")]
    ComputeAt(#[from] ComputeAtError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for fusegraph operations
pub type Result<T> = std::result::Result<T, FusegraphError>;
