//! Domain models for compute-at mapping
//!
//! Core abstractions independent of how the graph is built:
//! - IdMappingMode: the three equivalence relations
//! - DisjointSets: handle-keyed union-find with a class→members index
//! - IndexVariable / LoopIndex: what a LOOP class iterates with

pub mod disjoint_sets;
pub mod index_variable;
pub mod mapping_mode;

pub use disjoint_sets::{ClassId, DisjointSets};
pub use index_variable::{DoubleBufferIndices, DoubleBufferStage, IndexVariable, LoopIndex};
pub use mapping_mode::IdMappingMode;
