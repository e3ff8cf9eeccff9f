/*
 * Fusegraph IR - Iteration-domain mapping for fused tensor programs
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (arena handles)
 * - features/    : Vertical slices (fusion → transform_replay → compute_at)
 * - config/      : Versioned YAML configuration
 *
 * The compute_at slice decides which loop dimensions of different tensor
 * operations are the same loop, picks one concrete representative per
 * equivalence class, and allocates loop index variables.
 */

// Crate-level lint configuration
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::upper_case_acronyms)] // TIDx, BIDx naming

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules (fusion model, transform replay, compute-at mapping)
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::ComputeAtConfig;
pub use errors::{FusegraphError, Result};
pub use features::compute_at::{
    ComputeAtError, ComputeAtMap, ComputeAtStats, DoubleBufferStage, IdMappingMode,
    IdMappingQuery, IndexVariable, IterDomainGraph, LoopIndex,
};
pub use features::fusion::{
    Extent, Fusion, FusionError, IterDomain, IterType, OpKind, ParallelType, TensorView,
};
pub use shared::models::{ExprId, IterDomainId, TensorViewId, TransformId};
