//! Compute-at map error types
//!
//! Build-time variants carry rendered domains (`iS4{i0}`) since the fusion is
//! at hand; query-time variants carry bare handles.

use super::domain::IdMappingMode;
use crate::config::ConfigError;
use crate::features::fusion::{FusionError, ParallelType};
use crate::features::transform_replay::ReplayError;
use crate::shared::models::{ExprId, IterDomainId, TensorViewId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComputeAtError {
    /// Sibling outputs of one expression must have equal root rank
    #[error(
        "Multi-output expression {expr} has outputs of different root rank: \
         {first} has {first_rank}, {other} has {other_rank}"
    )]
    MultiOutputRankMismatch {
        expr: ExprId,
        first: TensorViewId,
        first_rank: usize,
        other: TensorViewId,
        other_rank: usize,
    },

    /// Producer/consumer root correspondence failed
    #[error("Failed to map root domains across {expr}: {source}")]
    RootMapping {
        expr: ExprId,
        #[source]
        source: ReplayError,
    },

    #[error("Empty {mode} disjoint set found for {id}")]
    EmptyClass { id: String, mode: IdMappingMode },

    #[error("No concrete id candidate in {mode} set of {id}")]
    NoConcreteCandidate { id: String, mode: IdMappingMode },

    /// The LOOP concrete id does not cover every root of its class
    #[error(
        "Concrete id {concrete} does not cover all roots of its loop class.\n\
         Ids: {ids}\nCandidates: {candidates}\nRoots of all ids: {all_roots}\n\
         Missing roots: {missing_roots}"
    )]
    IncompleteLoopConcreteId {
        concrete: String,
        ids: String,
        candidates: String,
        all_roots: String,
        missing_roots: String,
    },

    /// Two different non-serial parallel types in one LOOP class
    #[error(
        "Conflicting parallel types in loop class of {id}: found {found} while \
         the class is already bound to {common}"
    )]
    ParallelTypeConflict {
        id: String,
        common: ParallelType,
        found: ParallelType,
    },

    #[error("{id} is not registered in the {mode} map")]
    UnregisteredDomain { id: IterDomainId, mode: IdMappingMode },

    #[error("Concrete id not computed for {id} in the {mode} map")]
    ConcreteIdNotComputed { id: IterDomainId, mode: IdMappingMode },

    #[error("Index variables not allocated for the loop class of {id}")]
    IndexVariablesNotAllocated { id: IterDomainId },

    #[error(transparent)]
    Fusion(#[from] FusionError),

    #[error("Invalid compute-at configuration: {0}")]
    Config(#[from] ConfigError),
}

pub type ComputeAtResult<T> = Result<T, ComputeAtError>;
