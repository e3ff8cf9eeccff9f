//! Iteration Domain Graph
//!
//! Builds the EXACT, PERMISSIVE and LOOP partitions of every iteration domain
//! in a fusion, plus the sibling partition of multi-output expressions and
//! the cross-tensor consumer/producer adjacency.
//!
//! # Algorithm
//! For every expression, in definition order:
//! 1. Sibling outputs are replayed onto the first output and every matched
//!    pair is unioned in all four partitions (LOOP only for leaf domains).
//! 2. For every producer input, the permissive and exact root maps are
//!    extended through the consumer's split/merge history by best-effort
//!    replay. Exact pairs go to EXACT, permissive pairs to PERMISSIVE, and
//!    permissive pairs whose producer side lies inside the producer's
//!    compute-at prefix go to LOOP.
//! 3. Permissive root pairs are unioned directly into PERMISSIVE so that
//!    root correspondences survive a replay that stopped early.
//!
//! Every pair added to any partition also records consumer→producer
//! adjacency.

use crate::features::compute_at::domain::{DisjointSets, IdMappingMode};
use crate::features::compute_at::error::{ComputeAtError, ComputeAtResult};
use crate::features::fusion::{Expr, Fusion, TensorView};
use crate::features::transform_replay::{
    ids_between, BestEffortReplay, Forwarding, IdMap, PairwiseRootDomainMap,
};
use crate::shared::models::{IterDomainId, TensorViewId};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

#[derive(Debug, Clone, Default)]
pub struct IterDomainGraph {
    exact_nodes: DisjointSets,
    permissive_nodes: DisjointSets,
    loop_nodes: DisjointSets,
    sibling_sets: DisjointSets,

    /// Cross-tensor adjacency: domain → domains of consumers mapped to it
    consumers: FxHashMap<IterDomainId, Vec<IterDomainId>>,
    /// Cross-tensor adjacency: domain → domains of producers mapped to it
    producers: FxHashMap<IterDomainId, Vec<IterDomainId>>,

    /// Every domain between root and leaf of every tensor, in discovery order
    all_ids: Vec<IterDomainId>,
    view_rfactor_ids: FxHashSet<IterDomainId>,
}

impl IterDomainGraph {
    pub fn build(fusion: &Fusion) -> ComputeAtResult<Self> {
        let mut graph = Self::default();

        for tv in fusion.tensor_views() {
            graph.initialize_tensor(fusion, tv);
        }

        for expr in fusion.exprs() {
            graph.map_expr(fusion, expr)?;
        }

        graph.exact_nodes.freeze();
        graph.permissive_nodes.freeze();
        graph.loop_nodes.freeze();
        graph.sibling_sets.freeze();

        debug!(
            "iter domain graph: {} ids, {} exact / {} permissive / {} loop sets",
            graph.all_ids.len(),
            graph.exact_nodes.count(),
            graph.permissive_nodes.count(),
            graph.loop_nodes.count()
        );
        Ok(graph)
    }

    fn initialize_tensor(&mut self, fusion: &Fusion, tv: &TensorView) {
        let ids = ids_between(fusion, &tv.root, &tv.leaf);
        for id in ids {
            let is_view_rfactor =
                tv.view_like && fusion.iter_domain(id).is_rfactor_product && tv.in_rfactor(id);
            self.initialize_id(id, is_view_rfactor, tv.is_leaf(id));
        }
    }

    fn initialize_id(&mut self, id: IterDomainId, is_view_rfactor: bool, is_leaf: bool) {
        if !self.permissive_nodes.initialize_set(id) {
            return;
        }
        self.exact_nodes.initialize_set(id);
        if is_leaf {
            self.loop_nodes.initialize_set(id);
        }
        self.sibling_sets.initialize_set(id);
        self.consumers.entry(id).or_default();
        self.producers.entry(id).or_default();
        self.all_ids.push(id);
        if is_view_rfactor {
            self.view_rfactor_ids.insert(id);
        }
    }

    fn map_expr(&mut self, fusion: &Fusion, expr: &Expr) -> ComputeAtResult<()> {
        let Some((&first, others)) = expr.outputs.split_first() else {
            return Ok(());
        };
        trace!(
            "mapping {} ({}): {} inputs, {} outputs",
            expr.id,
            expr.kind.name(),
            expr.inputs.len(),
            expr.outputs.len()
        );

        for &other in others {
            self.map_siblings(fusion, expr, first, other)?;
        }

        for &consumer in &expr.outputs {
            for &producer in &expr.inputs {
                self.map_producer_consumer(fusion, expr, producer, consumer)?;
            }
        }
        Ok(())
    }

    /// Union `other`'s domains with their counterparts in `first`
    fn map_siblings(
        &mut self,
        fusion: &Fusion,
        expr: &Expr,
        first: TensorViewId,
        other: TensorViewId,
    ) -> ComputeAtResult<()> {
        let first_tv = fusion.tensor_view(first);
        let other_tv = fusion.tensor_view(other);
        if first_tv.root.len() != other_tv.root.len() {
            return Err(ComputeAtError::MultiOutputRankMismatch {
                expr: expr.id,
                first,
                first_rank: first_tv.root.len(),
                other,
                other_rank: other_tv.root.len(),
            });
        }

        let root: IdMap = other_tv
            .root
            .iter()
            .copied()
            .zip(first_tv.root.iter().copied())
            .collect();
        let other_to_first =
            BestEffortReplay::new(fusion, &other_tv.leaf, root, Forwarding::Disabled).into_map();

        for (o_id, f_id) in other_to_first.iter() {
            self.permissive_nodes.map_entries(f_id, o_id);
            self.exact_nodes.map_entries(f_id, o_id);
            if first_tv.is_leaf(f_id) {
                self.loop_nodes.map_entries(f_id, o_id);
            }
            self.sibling_sets.map_entries(f_id, o_id);
        }
        Ok(())
    }

    fn map_producer_consumer(
        &mut self,
        fusion: &Fusion,
        expr: &Expr,
        producer: TensorViewId,
        consumer: TensorViewId,
    ) -> ComputeAtResult<()> {
        let root_error = |source| ComputeAtError::RootMapping {
            expr: expr.id,
            source,
        };
        let p_tv = fusion.tensor_view(producer);

        let permissive_map = PairwiseRootDomainMap::new(producer, consumer);
        let permissive_root = permissive_map
            .map_consumer_to_producer(fusion)
            .map_err(root_error)?;
        let permissive_c2p =
            BestEffortReplay::replay_producer_as_consumer(fusion, producer, consumer, &permissive_map)
                .map_err(root_error)?
                .into_map();

        let exact_map = PairwiseRootDomainMap::new(producer, consumer).exact(true);
        let exact_c2p =
            BestEffortReplay::replay_producer_as_consumer(fusion, producer, consumer, &exact_map)
                .map_err(root_error)?
                .into_map();

        for (c_id, p_id) in exact_c2p.iter() {
            self.exact_nodes.map_entries(c_id, p_id);
            self.record_adjacency(c_id, p_id);
        }

        for (c_id, p_id) in permissive_c2p.iter() {
            if p_tv.is_compute_at_leaf(p_id) {
                self.loop_nodes.map_entries(c_id, p_id);
            }
            self.permissive_nodes.map_entries(c_id, p_id);
            self.record_adjacency(c_id, p_id);
        }

        for (c_id, p_id) in permissive_root.iter() {
            self.permissive_nodes.map_entries(c_id, p_id);
            self.record_adjacency(c_id, p_id);
        }
        Ok(())
    }

    fn record_adjacency(&mut self, consumer: IterDomainId, producer: IterDomainId) {
        let consumers = self.consumers.entry(producer).or_default();
        if !consumers.contains(&consumer) {
            consumers.push(consumer);
        }
        let producers = self.producers.entry(consumer).or_default();
        if !producers.contains(&producer) {
            producers.push(producer);
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════

    pub fn nodes(&self, mode: IdMappingMode) -> &DisjointSets {
        match mode {
            IdMappingMode::Exact => &self.exact_nodes,
            IdMappingMode::Permissive => &self.permissive_nodes,
            IdMappingMode::Loop => &self.loop_nodes,
        }
    }

    pub fn exact_nodes(&self) -> &DisjointSets {
        &self.exact_nodes
    }

    pub fn permissive_nodes(&self) -> &DisjointSets {
        &self.permissive_nodes
    }

    pub fn loop_nodes(&self) -> &DisjointSets {
        &self.loop_nodes
    }

    pub fn sibling_sets(&self) -> &DisjointSets {
        &self.sibling_sets
    }

    /// Domains of consumer tensors mapped to `id`
    pub fn consumers_of(&self, id: IterDomainId) -> &[IterDomainId] {
        self.consumers.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Domains of producer tensors mapped to `id`
    pub fn producers_of(&self, id: IterDomainId) -> &[IterDomainId] {
        self.producers.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn all_ids(&self) -> &[IterDomainId] {
        &self.all_ids
    }

    /// Rfactor domains of view-like tensors
    pub fn view_rfactor_ids(&self) -> &FxHashSet<IterDomainId> {
        &self.view_rfactor_ids
    }

    #[inline]
    pub fn is_view_rfactor(&self, id: IterDomainId) -> bool {
        self.view_rfactor_ids.contains(&id)
    }
}
