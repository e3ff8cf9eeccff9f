//! # Compute-at Mapping
//!
//! Decides which loop dimensions of different tensor operations are the
//! same dimension, under three relations:
//! - **EXACT**: same extent; broadcasts only match broadcasts
//! - **PERMISSIVE**: broadcasts match whatever they are broadcast against
//! - **LOOP**: generated by the same for-loop (compute-at sharing)
//!
//! On top of the relations, `ComputeAtMap` picks one concrete representative
//! per class, propagates parallel bindings across LOOP classes and allocates
//! loop index variables.
//!
//! ## Usage
//! ```text
//! use fusegraph_ir::features::compute_at::{ComputeAtMap, IdMappingMode};
//!
//! let mut map = ComputeAtMap::new(&fusion)?;
//! map.validate_and_propagate_ptype(&mut fusion)?;
//! map.allocate_index_variables(&fusion)?;
//! assert!(map.are_mapped(producer_id, consumer_id, IdMappingMode::Exact)?);
//! ```

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

// Re-exports for public API
pub use application::{ComputeAtMap, ComputeAtMapDisplay, ComputeAtSnapshot, ComputeAtStats};
pub use domain::{
    ClassId, DisjointSets, DoubleBufferIndices, DoubleBufferStage, IdMappingMode, IndexVariable,
    LoopIndex,
};
pub use error::{ComputeAtError, ComputeAtResult};
pub use infrastructure::IterDomainGraph;
pub use ports::IdMappingQuery;
// Internal use - prefer the application layer
#[doc(hidden)]
pub use infrastructure::{trace_root_ids, TrivialReductionInfo};
