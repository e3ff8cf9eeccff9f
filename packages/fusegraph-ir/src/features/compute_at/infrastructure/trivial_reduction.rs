//! Trivial reduction detection
//!
//! A reduction over an extent-1 domain does no work. Domains split or merged
//! exclusively out of such reductions are trivial as well. Concrete-id
//! scoring counts these like broadcasts.

use crate::features::fusion::Fusion;
use crate::shared::models::IterDomainId;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Default)]
pub struct TrivialReductionInfo {
    derived: FxHashSet<IterDomainId>,
}

impl TrivialReductionInfo {
    pub fn build(fusion: &Fusion) -> Self {
        let mut derived = FxHashSet::default();
        // Handle order is creation order, so transform inputs come first
        for raw in 0..fusion.num_iter_domains() as u32 {
            let id = IterDomainId::new(raw);
            let domain = fusion.iter_domain(id);
            if !domain.is_reduction() {
                continue;
            }
            let trivial = domain.extent.is_one()
                || fusion.definition_of(id).map_or(false, |transform| {
                    transform
                        .inputs()
                        .iter()
                        .all(|input| derived.contains(input))
                });
            if trivial {
                derived.insert(id);
            }
        }
        Self { derived }
    }

    #[inline]
    pub fn is_derived(&self, id: IterDomainId) -> bool {
        self.derived.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.derived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.derived.is_empty()
    }
}
