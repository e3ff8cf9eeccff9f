//! Best-effort transform replay
//!
//! Starting from a root correspondence target→replay, walks the target's
//! split/merge history oldest first. A target transform is matched when all
//! of its inputs are mapped and the replay side consumes the mapped inputs
//! with the same kind of transform in the same operand roles (and, for
//! splits, the same factor and direction). Matched outputs are mapped;
//! anything else stays unmapped.
//!
//! With forwarding on, a target merge of a mapped domain with an unmapped
//! broadcast maps its output to the mapped domain's counterpart. This lets a
//! consumer that merged in a broadcast axis keep sharing loops with a
//! producer that never had that axis.

use super::dependency_check::history_transforms;
use super::error::ReplayResult;
use super::id_map::IdMap;
use super::root_domain_map::PairwiseRootDomainMap;
use crate::features::fusion::{Fusion, IdTransform};
use crate::shared::models::{IterDomainId, TensorViewId};
use tracing::trace;

/// Whether broadcast merges on the target side are forwarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forwarding {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone)]
pub struct BestEffortReplay {
    target_to_replay: IdMap,
    forwarded: Vec<IterDomainId>,
}

impl BestEffortReplay {
    /// Replay the history of `target_leaf` onto whatever the root map points at
    pub fn new(
        fusion: &Fusion,
        target_leaf: &[IterDomainId],
        target_to_replay_root: IdMap,
        forwarding: Forwarding,
    ) -> Self {
        let mut replay = Self {
            target_to_replay: target_to_replay_root,
            forwarded: Vec::new(),
        };
        for transform in history_transforms(fusion, target_leaf) {
            replay.replay_transform(fusion, fusion.transform(transform), forwarding);
        }
        replay
    }

    /// Consumer→producer map of `producer` replayed as `consumer`
    pub fn replay_producer_as_consumer(
        fusion: &Fusion,
        producer: TensorViewId,
        consumer: TensorViewId,
        root_map: &PairwiseRootDomainMap,
    ) -> ReplayResult<Self> {
        let root = root_map.map_consumer_to_producer(fusion)?;
        let forwarding = if root_map.is_exact() {
            Forwarding::Disabled
        } else {
            Forwarding::Enabled
        };
        trace!(
            "replaying {} as {} from {} root pairs",
            producer,
            consumer,
            root.len()
        );
        Ok(Self::new(
            fusion,
            &fusion.tensor_view(consumer).leaf,
            root,
            forwarding,
        ))
    }

    fn replay_transform(&mut self, fusion: &Fusion, transform: &IdTransform, forwarding: Forwarding) {
        match *transform {
            IdTransform::Split {
                input,
                outer,
                inner,
                factor,
                inner_split,
            } => {
                let Some(replay_input) = self.target_to_replay.get(input) else {
                    return;
                };
                if let Some(IdTransform::Split {
                    input: r_input,
                    outer: r_outer,
                    inner: r_inner,
                    factor: r_factor,
                    inner_split: r_inner_split,
                }) = fusion.use_of(replay_input)
                {
                    if *r_input == replay_input && *r_factor == factor && *r_inner_split == inner_split {
                        self.target_to_replay.insert(outer, *r_outer);
                        self.target_to_replay.insert(inner, *r_inner);
                    }
                }
            }
            IdTransform::Merge {
                outer,
                inner,
                output,
            } => match (self.target_to_replay.get(outer), self.target_to_replay.get(inner)) {
                (Some(replay_outer), Some(replay_inner)) => {
                    if let Some(IdTransform::Merge {
                        outer: r_outer,
                        inner: r_inner,
                        output: r_output,
                    }) = fusion.use_of(replay_outer)
                    {
                        if *r_outer == replay_outer && *r_inner == replay_inner {
                            self.target_to_replay.insert(output, *r_output);
                        }
                    }
                }
                (Some(mapped), None)
                    if forwarding == Forwarding::Enabled
                        && fusion.iter_domain(inner).is_broadcast() =>
                {
                    self.forward(output, mapped);
                }
                (None, Some(mapped))
                    if forwarding == Forwarding::Enabled
                        && fusion.iter_domain(outer).is_broadcast() =>
                {
                    self.forward(output, mapped);
                }
                _ => {}
            },
        }
    }

    fn forward(&mut self, target: IterDomainId, replay: IterDomainId) {
        trace!("forwarding {} onto {}", target, replay);
        self.target_to_replay.insert(target, replay);
        self.forwarded.push(target);
    }

    /// Target→replay pairs, roots included
    pub fn get_replay(&self) -> &IdMap {
        &self.target_to_replay
    }

    /// Target domains mapped by forwarding through a broadcast merge
    pub fn forwarded_ids(&self) -> &[IterDomainId] {
        &self.forwarded
    }

    pub fn into_map(self) -> IdMap {
        self.target_to_replay
    }
}
