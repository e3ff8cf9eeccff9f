//! Iteration-domain transforms
//!
//! Splits and merges are the only structural steps between a tensor's root
//! domain and its leaf domain. Reorders only permute the leaf vector and
//! leave no node behind.

use crate::shared::models::IterDomainId;
use serde::{Deserialize, Serialize};

/// A split or merge recorded in the fusion arena
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdTransform {
    /// `input` → (`outer`, `inner`); `inner_split` puts `factor` on the inner output
    Split {
        input: IterDomainId,
        outer: IterDomainId,
        inner: IterDomainId,
        factor: i64,
        inner_split: bool,
    },

    /// (`outer`, `inner`) → `output`
    Merge {
        outer: IterDomainId,
        inner: IterDomainId,
        output: IterDomainId,
    },
}

impl IdTransform {
    pub fn inputs(&self) -> Vec<IterDomainId> {
        match self {
            IdTransform::Split { input, .. } => vec![*input],
            IdTransform::Merge { outer, inner, .. } => vec![*outer, *inner],
        }
    }

    pub fn outputs(&self) -> Vec<IterDomainId> {
        match self {
            IdTransform::Split { outer, inner, .. } => vec![*outer, *inner],
            IdTransform::Merge { output, .. } => vec![*output],
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self, IdTransform::Split { .. })
    }

    pub fn is_merge(&self) -> bool {
        matches!(self, IdTransform::Merge { .. })
    }
}
