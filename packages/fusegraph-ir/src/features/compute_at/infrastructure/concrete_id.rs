//! Concrete id resolution
//!
//! Picks one representative per class of each partition. The representative
//! must be a domain that no other member of its class is derived from (no
//! consumer of it sits in the same class), and among those the one whose
//! transform history covers the most iteration roots, then the most
//! broadcast roots.
//!
//! PERMISSIVE is resolved first, then EXACT, then LOOP. LOOP candidates are
//! compared through the EXACT concrete ids of their roots, so a LOOP concrete
//! id can be checked for covering every root its class depends on.

use crate::features::compute_at::domain::{ClassId, IdMappingMode};
use crate::features::compute_at::error::{ComputeAtError, ComputeAtResult};
use crate::features::compute_at::infrastructure::id_graph::IterDomainGraph;
use crate::features::compute_at::infrastructure::trivial_reduction::TrivialReductionInfo;
use crate::features::fusion::Fusion;
use crate::shared::models::IterDomainId;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use tracing::trace;

/// Concrete id of every class, per mode
#[derive(Debug, Clone, Default)]
pub struct ConcreteIdCache {
    permissive: FxHashMap<ClassId, IterDomainId>,
    exact: FxHashMap<ClassId, IterDomainId>,
    loop_: FxHashMap<ClassId, IterDomainId>,
}

impl ConcreteIdCache {
    fn table(&self, mode: IdMappingMode) -> &FxHashMap<ClassId, IterDomainId> {
        match mode {
            IdMappingMode::Permissive => &self.permissive,
            IdMappingMode::Exact => &self.exact,
            IdMappingMode::Loop => &self.loop_,
        }
    }

    fn table_mut(&mut self, mode: IdMappingMode) -> &mut FxHashMap<ClassId, IterDomainId> {
        match mode {
            IdMappingMode::Permissive => &mut self.permissive,
            IdMappingMode::Exact => &mut self.exact,
            IdMappingMode::Loop => &mut self.loop_,
        }
    }

    pub fn get(&self, mode: IdMappingMode, class: ClassId) -> Option<IterDomainId> {
        self.table(mode).get(&class).copied()
    }

    pub fn insert(&mut self, mode: IdMappingMode, class: ClassId, concrete: IterDomainId) {
        self.table_mut(mode).insert(class, concrete);
    }

    pub fn len(&self, mode: IdMappingMode) -> usize {
        self.table(mode).len()
    }
}

/// Roots `id` is derived from through split/merge definitions
///
/// Traversal stops at view-rfactor domains, which count as roots. Returned in
/// discovery order without duplicates.
pub fn trace_root_ids(
    fusion: &Fusion,
    graph: &IterDomainGraph,
    id: IterDomainId,
) -> Vec<IterDomainId> {
    let mut roots = Vec::new();
    let mut seen: FxHashSet<IterDomainId> = FxHashSet::default();
    let mut to_visit: VecDeque<IterDomainId> = VecDeque::from([id]);
    while let Some(current) = to_visit.pop_front() {
        if !seen.insert(current) {
            continue;
        }
        if graph.is_view_rfactor(current) {
            roots.push(current);
            continue;
        }
        match fusion.definition_of(current) {
            Some(transform) => to_visit.extend(transform.inputs()),
            None => roots.push(current),
        }
    }
    roots
}

pub struct ConcreteIdResolver<'a> {
    fusion: &'a Fusion,
    graph: &'a IterDomainGraph,
    trivial_reductions: &'a TrivialReductionInfo,
    validate_loop_completeness: bool,
}

impl<'a> ConcreteIdResolver<'a> {
    pub fn new(
        fusion: &'a Fusion,
        graph: &'a IterDomainGraph,
        trivial_reductions: &'a TrivialReductionInfo,
    ) -> Self {
        Self {
            fusion,
            graph,
            trivial_reductions,
            validate_loop_completeness: true,
        }
    }

    pub fn validate_loop_completeness(mut self, validate: bool) -> Self {
        self.validate_loop_completeness = validate;
        self
    }

    /// Resolve every class of every mode
    pub fn resolve_all(&self) -> ComputeAtResult<ConcreteIdCache> {
        let mut cache = ConcreteIdCache::default();
        for mode in IdMappingMode::RESOLUTION_ORDER {
            for (class, members) in self.graph.nodes(mode).classes() {
                let concrete = self.compute_concrete_id(mode, class, members, &cache)?;
                cache.insert(mode, class, concrete);
            }
            trace!("resolved {} {} concrete ids", cache.len(mode), mode);
        }
        Ok(cache)
    }

    fn compute_concrete_id(
        &self,
        mode: IdMappingMode,
        class: ClassId,
        members: &[IterDomainId],
        cache: &ConcreteIdCache,
    ) -> ComputeAtResult<IterDomainId> {
        let Some(&first) = members.first() else {
            return Err(ComputeAtError::EmptyClass {
                id: class.to_string(),
                mode,
            });
        };
        if members.len() == 1 {
            return Ok(first);
        }

        let nodes = self.graph.nodes(mode);
        let candidates: Vec<IterDomainId> = members
            .iter()
            .copied()
            .filter(|id| {
                !self
                    .graph
                    .consumers_of(*id)
                    .iter()
                    .any(|consumer| nodes.strict_are_mapped(*consumer, *id))
            })
            .collect();

        match candidates.as_slice() {
            [] => {
                return Err(ComputeAtError::NoConcreteCandidate {
                    id: self.render(first),
                    mode,
                })
            }
            [only] => return Ok(*only),
            _ => {}
        }

        // LOOP bookkeeping, keyed on EXACT concrete ids of roots
        let mut roots_of_all_ids: Vec<IterDomainId> = Vec::new();
        let mut root_to_candidates: FxHashMap<IterDomainId, Vec<IterDomainId>> =
            FxHashMap::default();
        let mut roots_of_candidate: FxHashMap<IterDomainId, FxHashSet<IterDomainId>> =
            FxHashMap::default();

        let mut best: Option<(IterDomainId, usize, usize)> = None;
        for &candidate in &candidates {
            let roots = trace_root_ids(self.fusion, self.graph, candidate);

            if mode == IdMappingMode::Loop {
                let exact_roots = roots_of_candidate.entry(candidate).or_default();
                for &root in &roots {
                    let exact_concrete = self.exact_concrete(root, cache)?;
                    if !roots_of_all_ids.contains(&exact_concrete) {
                        roots_of_all_ids.push(exact_concrete);
                    }
                    let owners = root_to_candidates.entry(exact_concrete).or_default();
                    if !owners.contains(&candidate) {
                        owners.push(candidate);
                    }
                    exact_roots.insert(exact_concrete);
                }
            }

            let bcast_count = roots.iter().filter(|root| self.is_broadcast_like(**root)).count();
            let iter_count = roots.len() - bcast_count;
            let better = match best {
                None => true,
                Some((_, best_iter, best_bcast)) => {
                    iter_count > best_iter || (iter_count == best_iter && bcast_count > best_bcast)
                }
            };
            if better {
                best = Some((candidate, iter_count, bcast_count));
            }
        }

        let Some((concrete, _, _)) = best else {
            return Err(ComputeAtError::NoConcreteCandidate {
                id: self.render(first),
                mode,
            });
        };

        if mode == IdMappingMode::Loop && self.validate_loop_completeness {
            let concrete_roots = roots_of_candidate.get(&concrete).cloned().unwrap_or_default();
            let missing: Vec<IterDomainId> = roots_of_all_ids
                .iter()
                .copied()
                .filter(|root| {
                    !self.root_is_covered(concrete, *root, &concrete_roots, &root_to_candidates)
                })
                .collect();
            if !missing.is_empty() {
                return Err(ComputeAtError::IncompleteLoopConcreteId {
                    concrete: self.render(concrete),
                    ids: self.render_all(members),
                    candidates: self.render_all(&candidates),
                    all_roots: self.render_all(&roots_of_all_ids),
                    missing_roots: self.render_all(&missing),
                });
            }
        }

        Ok(concrete)
    }

    fn root_is_covered(
        &self,
        concrete: IterDomainId,
        root: IterDomainId,
        concrete_roots: &FxHashSet<IterDomainId>,
        root_to_candidates: &FxHashMap<IterDomainId, Vec<IterDomainId>>,
    ) -> bool {
        if concrete_roots.contains(&root) {
            return true;
        }

        // A broadcast root is covered by the iteration root it was resolved to
        let permissive = self.graph.permissive_nodes();
        if self.is_broadcast_like(root)
            && concrete_roots.iter().any(|concrete_root| {
                !self.is_broadcast_like(*concrete_root)
                    && permissive.strict_are_mapped(root, *concrete_root)
            })
        {
            return true;
        }

        // Only reached through candidates that are the concrete id anyway
        let exact = self.graph.exact_nodes();
        root_to_candidates
            .get(&root)
            .map_or(false, |owners| {
                owners
                    .iter()
                    .all(|candidate| exact.strict_are_mapped(concrete, *candidate))
            })
    }

    fn exact_concrete(
        &self,
        id: IterDomainId,
        cache: &ConcreteIdCache,
    ) -> ComputeAtResult<IterDomainId> {
        let mode = IdMappingMode::Exact;
        let class = self
            .graph
            .exact_nodes()
            .class_of(id)
            .ok_or(ComputeAtError::UnregisteredDomain { id, mode })?;
        cache
            .get(mode, class)
            .ok_or(ComputeAtError::ConcreteIdNotComputed { id, mode })
    }

    fn is_broadcast_like(&self, id: IterDomainId) -> bool {
        self.fusion.iter_domain(id).is_broadcast() || self.trivial_reductions.is_derived(id)
    }

    fn render(&self, id: IterDomainId) -> String {
        self.fusion.iter_domain(id).to_string()
    }

    fn render_all(&self, ids: &[IterDomainId]) -> String {
        let rendered: Vec<String> = ids.iter().map(|id| self.render(*id)).collect();
        format!("{{{}}}", rendered.join(", "))
    }
}
