//! # Fusion Model
//!
//! The operation graph the compute-at map is built from:
//! - **IterDomain**: one loop dimension at some point of its transform history
//! - **IdTransform**: split/merge steps linking iteration domains
//! - **TensorView**: root / rfactor / leaf domains plus compute-at position
//! - **Expr**: a tensor operation with producer inputs and consumer outputs
//!
//! `Fusion` owns every node in arenas and hands out `u32` handles. It also
//! carries the manual scheduling API (split, merge, reorder, compute-at,
//! parallelize) used to shape leaf domains before lowering.

pub mod application;
pub mod domain;
pub mod error;

pub use application::fusion::Fusion;
pub use domain::expr::{Expr, OpKind};
pub use domain::iter_domain::{Extent, IterDomain, IterType, ParallelType};
pub use domain::tensor_view::TensorView;
pub use domain::transform::IdTransform;
pub use error::{FusionError, FusionResult};
