//! Compute-at map
//!
//! Owns the iteration-domain graph of one fusion, the concrete id of every
//! class in every mode, and the index variables of LOOP classes. Built once
//! per compiled program; afterwards every query is a read-only lookup.
//!
//! # Usage
//! ```text
//! let mut map = ComputeAtMap::new(&fusion)?;
//! map.validate_and_propagate_ptype(&mut fusion)?;
//! map.allocate_index_variables(&fusion)?;
//!
//! let concrete = map.get_concrete_mapped_id(id, IdMappingMode::Loop)?;
//! let index = map.get_index_variable(id, DoubleBufferStage::NotApplicable)?;
//! ```

use crate::config::ComputeAtConfig;
use crate::features::compute_at::domain::{
    ClassId, DisjointSets, DoubleBufferIndices, DoubleBufferStage, IdMappingMode, IndexVariable,
    LoopIndex,
};
use crate::features::compute_at::error::{ComputeAtError, ComputeAtResult};
use crate::features::compute_at::infrastructure::concrete_id::{
    ConcreteIdCache, ConcreteIdResolver,
};
use crate::features::compute_at::infrastructure::id_graph::IterDomainGraph;
use crate::features::compute_at::infrastructure::trivial_reduction::TrivialReductionInfo;
use crate::features::fusion::{Fusion, ParallelType};
use crate::shared::models::IterDomainId;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// Statistics for compute-at map construction
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComputeAtStats {
    pub registered_ids: usize,
    pub exact_sets: usize,
    pub permissive_sets: usize,
    pub loop_sets: usize,
    pub sibling_sets: usize,
    pub view_rfactor_ids: usize,
    pub trivial_reductions: usize,
    pub double_buffered_sets: usize,
    pub index_symbols: u32,
    pub build_time_ms: f64,
}

#[derive(Debug, Clone)]
pub struct ComputeAtMap {
    config: ComputeAtConfig,
    id_graph: IterDomainGraph,
    concrete_id_cache: ConcreteIdCache,

    /// LOOP class → allocated index
    loop_index_variable_map: FxHashMap<ClassId, LoopIndex>,

    /// LOOP concrete ids of loops annotated double buffered
    double_buffered_loop_ids: FxHashSet<IterDomainId>,

    stats: ComputeAtStats,
}

impl ComputeAtMap {
    pub fn new(fusion: &Fusion) -> ComputeAtResult<Self> {
        Self::with_config(fusion, ComputeAtConfig::default())
    }

    pub fn with_config(fusion: &Fusion, config: ComputeAtConfig) -> ComputeAtResult<Self> {
        config.validate()?;
        let start = Instant::now();

        let id_graph = IterDomainGraph::build(fusion)?;
        let trivial_reductions = TrivialReductionInfo::build(fusion);
        let concrete_id_cache = ConcreteIdResolver::new(fusion, &id_graph, &trivial_reductions)
            .validate_loop_completeness(config.validate_loop_completeness)
            .resolve_all()?;

        let mut map = Self {
            config,
            id_graph,
            concrete_id_cache,
            loop_index_variable_map: FxHashMap::default(),
            double_buffered_loop_ids: FxHashSet::default(),
            stats: ComputeAtStats::default(),
        };
        map.double_buffered_loop_ids = map.collect_double_buffered(fusion)?;

        map.stats = ComputeAtStats {
            registered_ids: map.id_graph.all_ids().len(),
            exact_sets: map.id_graph.exact_nodes().count(),
            permissive_sets: map.id_graph.permissive_nodes().count(),
            loop_sets: map.id_graph.loop_nodes().count(),
            sibling_sets: map.id_graph.sibling_sets().count(),
            view_rfactor_ids: map.id_graph.view_rfactor_ids().len(),
            trivial_reductions: trivial_reductions.len(),
            double_buffered_sets: map.double_buffered_loop_ids.len(),
            index_symbols: 0,
            build_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        };

        info!(
            "compute at map: {} ids, {} exact / {} permissive / {} loop sets in {:.2}ms",
            map.stats.registered_ids,
            map.stats.exact_sets,
            map.stats.permissive_sets,
            map.stats.loop_sets,
            map.stats.build_time_ms
        );
        if map.config.dump_on_build {
            debug!("{}", map.display(fusion));
        }
        Ok(map)
    }

    /// Only loop (leaf) domains carry the annotation into a LOOP class
    fn collect_double_buffered(&self, fusion: &Fusion) -> ComputeAtResult<FxHashSet<IterDomainId>> {
        let loops = self.id_graph.loop_nodes();
        let mut loop_ids = FxHashSet::default();
        for &id in self.id_graph.all_ids() {
            if fusion.iter_domain(id).double_buffered && loops.mapping_exists(id) {
                loop_ids.insert(self.get_concrete_mapped_id(id, IdMappingMode::Loop)?);
            }
        }
        Ok(loop_ids)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Lowering passes
    // ═══════════════════════════════════════════════════════════════════

    /// Make every LOOP class agree on one parallel type and apply it
    ///
    /// Serial members are unconstrained; two different non-serial bindings
    /// in one class are an error. Classes with no binding are left as is.
    pub fn validate_and_propagate_ptype(&self, fusion: &mut Fusion) -> ComputeAtResult<()> {
        let mut propagated = 0usize;
        for (_, members) in self.id_graph.loop_nodes().classes() {
            let mut common = ParallelType::Serial;
            for &id in members {
                let found = fusion.iter_domain(id).parallel_type;
                if found == ParallelType::Serial {
                    continue;
                }
                if common == ParallelType::Serial {
                    common = found;
                } else if common != found {
                    return Err(ComputeAtError::ParallelTypeConflict {
                        id: fusion.iter_domain(id).to_string(),
                        common,
                        found,
                    });
                }
            }
            if common == ParallelType::Serial {
                continue;
            }
            for &id in members {
                fusion.set_parallel_type(id, common)?;
            }
            propagated += 1;
        }
        debug!("propagated parallel types over {} loop sets", propagated);
        Ok(())
    }

    /// Assign one index to every LOOP class
    ///
    /// Reads the current parallel bindings, halo and double-buffer
    /// annotations of `fusion`. Running it again reallocates from scratch.
    pub fn allocate_index_variables(&mut self, fusion: &Fusion) -> ComputeAtResult<()> {
        self.double_buffered_loop_ids = self.collect_double_buffered(fusion)?;

        let prefix = self.config.index_symbol_prefix.as_str();
        let mut next_symbol = 0u32;
        let mut fresh = || {
            let id = next_symbol;
            next_symbol += 1;
            IndexVariable::Symbol {
                id,
                name: format!("{}{}", prefix, id),
            }
        };

        let mut allocated = FxHashMap::default();
        for (class, members) in self.id_graph.loop_nodes().classes() {
            let Some(&first) = members.first() else {
                continue;
            };
            let thread_binding = members
                .iter()
                .map(|id| fusion.iter_domain(*id))
                .find(|domain| domain.is_thread() && !domain.halo_extended)
                .map(|domain| domain.parallel_type);

            let index = if let Some(ptype) = thread_binding {
                LoopIndex::Single(IndexVariable::ParallelIndex(ptype))
            } else if members
                .iter()
                .all(|id| fusion.iter_domain(*id).is_broadcast())
            {
                LoopIndex::Single(IndexVariable::Zero)
            } else if self.is_double_buffered(first) {
                LoopIndex::DoubleBuffered(DoubleBufferIndices {
                    prologue: fresh(),
                    main: fresh(),
                    epilogue: fresh(),
                })
            } else {
                LoopIndex::Single(fresh())
            };
            allocated.insert(class, index);
        }

        self.loop_index_variable_map = allocated;
        self.stats.index_symbols = next_symbol;
        self.stats.double_buffered_sets = self.double_buffered_loop_ids.len();
        debug!(
            "allocated {} loop indices ({} fresh symbols)",
            self.loop_index_variable_map.len(),
            next_symbol
        );
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════

    /// Index of `id`'s loop at `stage`
    pub fn get_index_variable(
        &self,
        id: IterDomainId,
        stage: DoubleBufferStage,
    ) -> ComputeAtResult<&IndexVariable> {
        Ok(self.loop_index(id)?.get(stage))
    }

    /// Full allocation of `id`'s LOOP class
    pub fn loop_index(&self, id: IterDomainId) -> ComputeAtResult<&LoopIndex> {
        let class = self.class_of(id, IdMappingMode::Loop)?;
        self.loop_index_variable_map
            .get(&class)
            .ok_or(ComputeAtError::IndexVariablesNotAllocated { id })
    }

    /// Whether `b` is in `a`'s class; `a` must be registered
    pub fn are_mapped(
        &self,
        a: IterDomainId,
        b: IterDomainId,
        mode: IdMappingMode,
    ) -> ComputeAtResult<bool> {
        let class = self.class_of(a, mode)?;
        Ok(self.id_sets(mode).class_of(b) == Some(class))
    }

    pub fn get_concrete_mapped_id(
        &self,
        id: IterDomainId,
        mode: IdMappingMode,
    ) -> ComputeAtResult<IterDomainId> {
        let class = self.class_of(id, mode)?;
        self.concrete_id_cache
            .get(mode, class)
            .ok_or(ComputeAtError::ConcreteIdNotComputed { id, mode })
    }

    /// Members of `id`'s class
    pub fn disjoint_set_of(
        &self,
        id: IterDomainId,
        mode: IdMappingMode,
    ) -> ComputeAtResult<&[IterDomainId]> {
        let class = self.class_of(id, mode)?;
        Ok(self.id_sets(mode).members(class))
    }

    pub fn id_sets(&self, mode: IdMappingMode) -> &DisjointSets {
        self.id_graph.nodes(mode)
    }

    pub fn id_graph(&self) -> &IterDomainGraph {
        &self.id_graph
    }

    pub fn is_view_rfactor(&self, id: IterDomainId) -> bool {
        self.id_graph.is_view_rfactor(id)
    }

    /// View-rfactor members of `id`'s class
    pub fn view_rfactor_domains_of_id_group(
        &self,
        id: IterDomainId,
        mode: IdMappingMode,
    ) -> ComputeAtResult<Vec<IterDomainId>> {
        Ok(self
            .disjoint_set_of(id, mode)?
            .iter()
            .copied()
            .filter(|member| self.is_view_rfactor(*member))
            .collect())
    }

    /// Whether `id`'s LOOP class holds a double-buffered loop
    pub fn is_double_buffered(&self, id: IterDomainId) -> bool {
        self.get_concrete_mapped_id(id, IdMappingMode::Loop)
            .map_or(false, |concrete| self.double_buffered_loop_ids.contains(&concrete))
    }

    pub fn stats(&self) -> &ComputeAtStats {
        &self.stats
    }

    pub fn config(&self) -> &ComputeAtConfig {
        &self.config
    }

    fn class_of(&self, id: IterDomainId, mode: IdMappingMode) -> ComputeAtResult<ClassId> {
        self.id_sets(mode)
            .class_of(id)
            .ok_or(ComputeAtError::UnregisteredDomain { id, mode })
    }
}
