//! Tensor View
//!
//! A tensor together with the history of its iteration domains.

use crate::shared::models::{ExprId, IterDomainId, TensorViewId};
use serde::{Deserialize, Serialize};

/// A tensor in the fusion and its domain history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorView {
    pub id: TensorViewId,

    /// Untransformed dimensions
    pub root: Vec<IterDomainId>,

    /// Post-reshape root of a view-like tensor
    pub rfactor: Option<Vec<IterDomainId>>,

    /// Loop (leaf) domain iterated by generated code
    pub leaf: Vec<IterDomainId>,

    /// `leaf[..compute_at_position]` shares loops with the consumer
    pub compute_at_position: usize,

    /// Consumer of a view-like reshape
    pub view_like: bool,

    /// Operation that produces this tensor
    pub definition: Option<ExprId>,
}

impl TensorView {
    pub fn new(id: TensorViewId, root: Vec<IterDomainId>) -> Self {
        Self {
            id,
            leaf: root.clone(),
            root,
            rfactor: None,
            compute_at_position: 0,
            view_like: false,
            definition: None,
        }
    }

    /// Rfactor domain when present, otherwise the root domain
    pub fn maybe_rfactor(&self) -> &[IterDomainId] {
        self.rfactor.as_deref().unwrap_or(&self.root)
    }

    #[inline]
    pub fn is_leaf(&self, id: IterDomainId) -> bool {
        self.leaf.contains(&id)
    }

    /// Leaf domain inside the compute-at-shared prefix
    #[inline]
    pub fn is_compute_at_leaf(&self, id: IterDomainId) -> bool {
        self.compute_at_leaves().contains(&id)
    }

    pub fn compute_at_leaves(&self) -> &[IterDomainId] {
        &self.leaf[..self.compute_at_position.min(self.leaf.len())]
    }

    pub fn in_rfactor(&self, id: IterDomainId) -> bool {
        self.rfactor.as_ref().map_or(false, |rf| rf.contains(&id))
    }

    #[inline]
    pub fn n_dims(&self) -> usize {
        self.leaf.len()
    }
}
