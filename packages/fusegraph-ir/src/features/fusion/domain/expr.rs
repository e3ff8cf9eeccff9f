//! Tensor operations

use crate::shared::models::{ExprId, TensorViewId};
use serde::{Deserialize, Serialize};

/// Kind of tensor operation, as far as root-domain correspondence cares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpKind {
    /// Elementwise over inputs of equal logical rank
    Pointwise,

    /// Some output root dims are reductions of the input
    Reduction,

    /// `new_dims[i]` marks output root dims with no input counterpart
    Broadcast { new_dims: Vec<bool> },

    /// Reshape-like factoring; the output carries an rfactor domain
    View,

    /// Multi-output reduction (average, variance, count)
    Welford,
}

impl OpKind {
    /// Output root positions introduced by the operation itself
    pub fn is_new_dim(&self, position: usize) -> bool {
        match self {
            OpKind::Broadcast { new_dims } => new_dims.get(position).copied().unwrap_or(false),
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OpKind::Pointwise => "pointwise",
            OpKind::Reduction => "reduction",
            OpKind::Broadcast { .. } => "broadcast",
            OpKind::View => "view",
            OpKind::Welford => "welford",
        }
    }
}

/// A tensor operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    pub id: ExprId,
    pub kind: OpKind,
    pub inputs: Vec<TensorViewId>,
    pub outputs: Vec<TensorViewId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_new_dims() {
        let kind = OpKind::Broadcast {
            new_dims: vec![false, true],
        };
        assert!(!kind.is_new_dim(0));
        assert!(kind.is_new_dim(1));
        assert!(!kind.is_new_dim(5));
        assert!(!OpKind::Pointwise.is_new_dim(0));
        assert_eq!(kind.name(), "broadcast");
    }
}
