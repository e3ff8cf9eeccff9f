//! Dependency closure over the split/merge graph

use crate::features::fusion::Fusion;
use crate::shared::models::{IterDomainId, TransformId};
use rustc_hash::FxHashSet;

/// Every domain on a transform path from `from` to `to`, endpoints included
///
/// Returned in handle order, which is creation order and therefore
/// topological.
pub fn ids_between(fusion: &Fusion, from: &[IterDomainId], to: &[IterDomainId]) -> Vec<IterDomainId> {
    let mut forward: FxHashSet<IterDomainId> = FxHashSet::default();
    let mut stack: Vec<IterDomainId> = from.to_vec();
    while let Some(id) = stack.pop() {
        if !forward.insert(id) {
            continue;
        }
        if let Some(transform) = fusion.use_of(id) {
            stack.extend(transform.outputs());
        }
    }

    let mut backward: FxHashSet<IterDomainId> = FxHashSet::default();
    stack.extend_from_slice(to);
    while let Some(id) = stack.pop() {
        if !backward.insert(id) {
            continue;
        }
        if let Some(transform) = fusion.definition_of(id) {
            stack.extend(transform.inputs());
        }
    }

    let mut between: Vec<IterDomainId> = forward.intersection(&backward).copied().collect();
    between.sort_unstable();
    between
}

/// Transforms in the history of `leaf`, oldest first
pub fn history_transforms(fusion: &Fusion, leaf: &[IterDomainId]) -> Vec<TransformId> {
    let mut visited: FxHashSet<IterDomainId> = FxHashSet::default();
    let mut transforms: FxHashSet<TransformId> = FxHashSet::default();
    let mut stack: Vec<IterDomainId> = leaf.to_vec();
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        if let Some(definition) = fusion.iter_domain(id).definition {
            transforms.insert(definition);
            stack.extend(fusion.transform(definition).inputs());
        }
    }
    let mut ordered: Vec<TransformId> = transforms.into_iter().collect();
    ordered.sort_unstable();
    ordered
}
