//! Ports (Interfaces) for compute-at mapping
//!
//! Code generation depends on these queries rather than on `ComputeAtMap`
//! itself.
//!
//! ```ignore
//! fn shares_loop<Q: IdMappingQuery>(query: &Q, a: IterDomainId, b: IterDomainId) -> bool {
//!     query.are_mapped(a, b, IdMappingMode::Loop).unwrap_or(false)
//! }
//! ```

use crate::features::compute_at::application::ComputeAtMap;
use crate::features::compute_at::domain::{DoubleBufferStage, IdMappingMode, IndexVariable};
use crate::features::compute_at::error::ComputeAtResult;
use crate::shared::models::IterDomainId;

/// Read-only iteration-domain mapping queries
pub trait IdMappingQuery {
    fn are_mapped(&self, a: IterDomainId, b: IterDomainId, mode: IdMappingMode)
        -> ComputeAtResult<bool>;

    fn concrete_mapped_id(&self, id: IterDomainId, mode: IdMappingMode)
        -> ComputeAtResult<IterDomainId>;

    fn index_variable(&self, id: IterDomainId, stage: DoubleBufferStage)
        -> ComputeAtResult<&IndexVariable>;
}

impl IdMappingQuery for ComputeAtMap {
    fn are_mapped(
        &self,
        a: IterDomainId,
        b: IterDomainId,
        mode: IdMappingMode,
    ) -> ComputeAtResult<bool> {
        ComputeAtMap::are_mapped(self, a, b, mode)
    }

    fn concrete_mapped_id(
        &self,
        id: IterDomainId,
        mode: IdMappingMode,
    ) -> ComputeAtResult<IterDomainId> {
        self.get_concrete_mapped_id(id, mode)
    }

    fn index_variable(
        &self,
        id: IterDomainId,
        stage: DoubleBufferStage,
    ) -> ComputeAtResult<&IndexVariable> {
        self.get_index_variable(id, stage)
    }
}
