//! Fusion model error types

use crate::shared::models::{IterDomainId, TensorViewId};
use thiserror::Error;

/// Errors raised while building or scheduling a fusion
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("Unknown tensor view {0}")]
    UnknownTensor(TensorViewId),

    #[error("Unknown iteration domain {0}")]
    UnknownDomain(IterDomainId),

    #[error("Axis {axis} out of range for {tv} with {ndims} leaf dims")]
    AxisOutOfRange {
        tv: TensorViewId,
        axis: usize,
        ndims: usize,
    },

    #[error("Invalid split factor {factor} on {tv}; factor must be positive")]
    InvalidSplitFactor { tv: TensorViewId, factor: i64 },

    #[error("Cannot merge {outer} with {inner} in {tv}: iteration kinds differ")]
    IncompatibleMerge {
        tv: TensorViewId,
        outer: String,
        inner: String,
    },

    #[error("Invalid compute-at position {position} for {tv} with {ndims} leaf dims")]
    InvalidComputeAt {
        tv: TensorViewId,
        position: usize,
        ndims: usize,
    },

    #[error("Invalid reorder of {tv}: {reason}")]
    InvalidReorder { tv: TensorViewId, reason: String },

    #[error("Malformed {kind} operation: {reason}")]
    MalformedOp { kind: &'static str, reason: String },
}

impl FusionError {
    pub fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        FusionError::MalformedOp {
            kind,
            reason: reason.into(),
        }
    }
}

/// Result type for fusion building and scheduling
pub type FusionResult<T> = Result<T, FusionError>;
