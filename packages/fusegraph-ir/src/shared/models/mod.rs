//! Shared models

mod ids;

pub use ids::{ExprId, IterDomainId, TensorViewId, TransformId};
