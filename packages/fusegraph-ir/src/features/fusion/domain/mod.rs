//! Domain models for the fusion graph

pub mod expr;
pub mod iter_domain;
pub mod tensor_view;
pub mod transform;

pub use expr::{Expr, OpKind};
pub use iter_domain::{Extent, IterDomain, IterType, ParallelType};
pub use tensor_view::TensorView;
pub use transform::IdTransform;
