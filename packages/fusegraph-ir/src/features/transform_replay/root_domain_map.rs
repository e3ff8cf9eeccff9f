//! Pairwise root-domain correspondence
//!
//! Pairs the producer's logical domain (rfactor or root, reductions removed)
//! with the consumer's root domain by position. Dims the consumer's own
//! operation introduced (new broadcast dims) have no producer counterpart and
//! are skipped.
//!
//! In exact mode a broadcast only corresponds to another broadcast; in
//! permissive mode a broadcast corresponds to whatever sits at its position.

use super::error::{ReplayError, ReplayResult};
use super::id_map::IdMap;
use crate::features::fusion::Fusion;
use crate::shared::models::{IterDomainId, TensorViewId};

#[derive(Debug, Clone, Copy)]
pub struct PairwiseRootDomainMap {
    producer: TensorViewId,
    consumer: TensorViewId,
    exact: bool,
}

impl PairwiseRootDomainMap {
    /// Permissive map between `producer` and `consumer`
    pub fn new(producer: TensorViewId, consumer: TensorViewId) -> Self {
        Self {
            producer,
            consumer,
            exact: false,
        }
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// Consumer root → producer logical pairs
    pub fn map_consumer_to_producer(&self, fusion: &Fusion) -> ReplayResult<IdMap> {
        let producer_dims = fusion.logical_domain(self.producer);

        let consumer = fusion.tensor_view(self.consumer);
        let definition = consumer.definition.map(|expr| &fusion.expr(expr).kind);
        let consumer_dims: Vec<IterDomainId> = consumer
            .root
            .iter()
            .enumerate()
            .filter(|(position, _)| !definition.map_or(false, |kind| kind.is_new_dim(*position)))
            .map(|(_, id)| *id)
            .collect();

        if producer_dims.len() != consumer_dims.len() {
            return Err(ReplayError::RootRankMismatch {
                producer: self.producer,
                consumer: self.consumer,
                producer_rank: producer_dims.len(),
                consumer_rank: consumer_dims.len(),
            });
        }

        let mut map = IdMap::new();
        for (c_id, p_id) in consumer_dims.into_iter().zip(producer_dims) {
            if self.exact
                && fusion.iter_domain(c_id).is_broadcast() != fusion.iter_domain(p_id).is_broadcast()
            {
                continue;
            }
            map.insert(c_id, p_id);
        }
        Ok(map)
    }
}
