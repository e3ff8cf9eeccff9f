//! Fusion arena
//!
//! Owns every iteration domain, transform, tensor and operation of one
//! compiled program and exposes the definition API (inputs, pointwise,
//! reduction, broadcast, view, welford) and the manual scheduling API
//! (split, merge, reorder, compute-at, parallelize).
//!
//! # Usage
//! ```text
//! let mut fusion = Fusion::new();
//! let tv0 = fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i1")]);
//! let tv1 = fusion.pointwise(&[tv0])?;
//! fusion.merge(tv1, 0)?;
//! fusion.split(tv1, 0, 128, true)?;
//! fusion.merge(tv0, 0)?;
//! fusion.split(tv0, 0, 128, true)?;
//! fusion.set_compute_at(tv0, 1)?;
//! ```

use crate::features::fusion::domain::{
    Expr, Extent, IdTransform, IterDomain, IterType, OpKind, ParallelType, TensorView,
};
use crate::features::fusion::error::{FusionError, FusionResult};
use crate::shared::models::{ExprId, IterDomainId, TensorViewId, TransformId};
use rustc_hash::FxHashMap;
use tracing::trace;

/// Arena of one fusion's nodes
#[derive(Debug, Clone, Default)]
pub struct Fusion {
    ids: Vec<IterDomain>,
    transforms: Vec<IdTransform>,
    /// Each domain feeds at most one transform
    uses: FxHashMap<IterDomainId, TransformId>,
    tvs: Vec<TensorView>,
    exprs: Vec<Expr>,
}

impl Fusion {
    pub fn new() -> Self {
        Self::default()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════

    /// Domain behind a handle minted by this fusion
    #[inline]
    pub fn iter_domain(&self, id: IterDomainId) -> &IterDomain {
        &self.ids[id.index()]
    }

    pub fn get_iter_domain(&self, id: IterDomainId) -> Option<&IterDomain> {
        self.ids.get(id.index())
    }

    /// Tensor behind a handle minted by this fusion
    #[inline]
    pub fn tensor_view(&self, tv: TensorViewId) -> &TensorView {
        &self.tvs[tv.index()]
    }

    pub fn get_tensor_view(&self, tv: TensorViewId) -> Option<&TensorView> {
        self.tvs.get(tv.index())
    }

    pub fn tensor_views(&self) -> impl Iterator<Item = &TensorView> {
        self.tvs.iter()
    }

    pub fn exprs(&self) -> &[Expr] {
        &self.exprs
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn transform(&self, id: TransformId) -> &IdTransform {
        &self.transforms[id.index()]
    }

    /// Transform consuming `id`, if any
    pub fn use_of(&self, id: IterDomainId) -> Option<&IdTransform> {
        self.uses.get(&id).map(|t| self.transform(*t))
    }

    /// Transform producing `id`, if any
    pub fn definition_of(&self, id: IterDomainId) -> Option<&IdTransform> {
        self.iter_domain(id).definition.map(|t| self.transform(t))
    }

    pub fn num_iter_domains(&self) -> usize {
        self.ids.len()
    }

    /// Producer-side logical domain: rfactor (or root) without reductions
    pub fn logical_domain(&self, tv: TensorViewId) -> Vec<IterDomainId> {
        self.tensor_view(tv)
            .maybe_rfactor()
            .iter()
            .copied()
            .filter(|id| !self.iter_domain(*id).is_reduction())
            .collect()
    }

    /// One-line rendering, e.g. `T2[iS4{i0}, bS5{1}] ca(1)`
    pub fn describe_tensor(&self, tv: TensorViewId) -> String {
        let view = self.tensor_view(tv);
        let dims: Vec<String> = view
            .leaf
            .iter()
            .map(|id| self.iter_domain(*id).to_string())
            .collect();
        format!("{}[{}] ca({})", tv, dims.join(", "), view.compute_at_position)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Definition API
    // ═══════════════════════════════════════════════════════════════════

    /// Input tensor whose dims are all `Iteration`
    pub fn new_input(&mut self, extents: &[Extent]) -> TensorViewId {
        let dims: Vec<(Extent, IterType)> = extents
            .iter()
            .map(|e| (e.clone(), IterType::Iteration))
            .collect();
        self.new_input_with_types(&dims)
    }

    /// Tensor with no defining operation and explicit dim kinds
    pub fn new_input_with_types(&mut self, dims: &[(Extent, IterType)]) -> TensorViewId {
        let root = dims
            .iter()
            .map(|(extent, iter_type)| self.new_domain(extent.clone(), *iter_type))
            .collect();
        self.new_tensor(root)
    }

    /// Elementwise operation; output dims take the first non-broadcast extent
    pub fn pointwise(&mut self, inputs: &[TensorViewId]) -> FusionResult<TensorViewId> {
        let kind = OpKind::Pointwise;
        if inputs.is_empty() {
            return Err(FusionError::malformed(kind.name(), "no inputs"));
        }
        let mut logical = Vec::with_capacity(inputs.len());
        for tv in inputs {
            self.check_tensor(*tv)?;
            logical.push(self.logical_domain(*tv));
        }
        let rank = logical[0].len();
        if let Some(bad) = logical.iter().position(|dims| dims.len() != rank) {
            return Err(FusionError::malformed(
                kind.name(),
                format!(
                    "input {} has rank {}, expected {}",
                    inputs[bad],
                    logical[bad].len(),
                    rank
                ),
            ));
        }

        let mut root = Vec::with_capacity(rank);
        for position in 0..rank {
            let concrete = logical
                .iter()
                .map(|dims| self.iter_domain(dims[position]))
                .find(|id| !id.is_broadcast());
            let (extent, iter_type) = match concrete {
                Some(id) => (id.extent.clone(), IterType::Iteration),
                None => (Extent::constant(1), IterType::Broadcast),
            };
            root.push(self.new_domain(extent, iter_type));
        }
        let out = self.new_tensor(root);
        self.push_expr(kind, inputs.to_vec(), vec![out]);
        Ok(out)
    }

    /// Reduce `axes` of the input's logical domain
    pub fn reduce(&mut self, input: TensorViewId, axes: &[usize]) -> FusionResult<TensorViewId> {
        let root = self.reduction_root(input, axes, "reduction")?;
        let out = self.new_tensor(root);
        self.push_expr(OpKind::Reduction, vec![input], vec![out]);
        Ok(out)
    }

    /// Welford reduction producing (average, variance, count)
    pub fn welford(
        &mut self,
        input: TensorViewId,
        axes: &[usize],
    ) -> FusionResult<[TensorViewId; 3]> {
        let mut outputs = [TensorViewId::new(0); 3];
        for slot in outputs.iter_mut() {
            let root = self.reduction_root(input, axes, "welford")?;
            *slot = self.new_tensor(root);
        }
        self.push_expr(OpKind::Welford, vec![input], outputs.to_vec());
        Ok(outputs)
    }

    /// Insert broadcast dims where `new_dims` is true
    pub fn broadcast(
        &mut self,
        input: TensorViewId,
        new_dims: &[bool],
    ) -> FusionResult<TensorViewId> {
        self.check_tensor(input)?;
        let logical = self.logical_domain(input);
        let kept = new_dims.iter().filter(|is_new| !**is_new).count();
        if kept != logical.len() {
            return Err(FusionError::malformed(
                "broadcast",
                format!(
                    "{} kept dims for input {} of rank {}",
                    kept,
                    input,
                    logical.len()
                ),
            ));
        }

        let mut source = logical.into_iter();
        let mut root = Vec::with_capacity(new_dims.len());
        for is_new in new_dims {
            let (extent, iter_type) = if *is_new {
                (Extent::constant(1), IterType::Broadcast)
            } else {
                // kept == logical.len(), so the iterator yields one per kept dim
                match source.next() {
                    Some(id) => {
                        let id = self.iter_domain(id);
                        let iter_type = if id.is_broadcast() {
                            IterType::Broadcast
                        } else {
                            IterType::Iteration
                        };
                        (id.extent.clone(), iter_type)
                    }
                    None => {
                        return Err(FusionError::malformed("broadcast", "ran out of input dims"))
                    }
                }
            };
            root.push(self.new_domain(extent, iter_type));
        }
        let out = self.new_tensor(root);
        self.push_expr(
            OpKind::Broadcast {
                new_dims: new_dims.to_vec(),
            },
            vec![input],
            vec![out],
        );
        Ok(out)
    }

    /// View-like reshape merging logical dims `axis` and `axis + 1`
    pub fn flatten(&mut self, input: TensorViewId, axis: usize) -> FusionResult<TensorViewId> {
        self.check_tensor(input)?;
        let logical = self.logical_domain(input);
        if axis + 1 >= logical.len() {
            return Err(FusionError::AxisOutOfRange {
                tv: input,
                axis: axis + 1,
                ndims: logical.len(),
            });
        }
        let dims: Vec<(Extent, IterType)> = logical
            .iter()
            .map(|id| {
                let source = self.iter_domain(*id);
                let iter_type = if source.is_broadcast() {
                    IterType::Broadcast
                } else {
                    IterType::Iteration
                };
                (source.extent.clone(), iter_type)
            })
            .collect();
        let root: Vec<IterDomainId> = dims
            .into_iter()
            .map(|(extent, iter_type)| self.new_domain(extent, iter_type))
            .collect();

        let out = self.new_tensor(root.clone());
        let merged = self.record_merge(out, root[axis], root[axis + 1])?;
        self.ids[merged.index()].is_rfactor_product = true;

        let mut rfactor = root;
        rfactor.splice(axis..axis + 2, [merged]);
        let view = &mut self.tvs[out.index()];
        view.leaf = rfactor.clone();
        view.rfactor = Some(rfactor);
        view.view_like = true;

        self.push_expr(OpKind::View, vec![input], vec![out]);
        Ok(out)
    }

    /// Register an operation over existing tensors
    pub fn add_op(
        &mut self,
        kind: OpKind,
        inputs: Vec<TensorViewId>,
        outputs: Vec<TensorViewId>,
    ) -> FusionResult<ExprId> {
        if outputs.is_empty() {
            return Err(FusionError::malformed(kind.name(), "no outputs"));
        }
        for tv in inputs.iter().chain(outputs.iter()) {
            self.check_tensor(*tv)?;
        }
        if let Some(tv) = outputs
            .iter()
            .find(|tv| self.tensor_view(**tv).definition.is_some())
        {
            return Err(FusionError::malformed(
                kind.name(),
                format!("output {} already has a definition", tv),
            ));
        }
        Ok(self.push_expr(kind, inputs, outputs))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Scheduling API
    // ═══════════════════════════════════════════════════════════════════

    /// Split leaf `axis`; `inner_split` places `factor` on the inner output
    pub fn split(
        &mut self,
        tv: TensorViewId,
        axis: usize,
        factor: i64,
        inner_split: bool,
    ) -> FusionResult<()> {
        let input = self.leaf_at(tv, axis)?;
        if factor <= 0 {
            return Err(FusionError::InvalidSplitFactor { tv, factor });
        }
        let source = self.iter_domain(input).clone();
        let (outer_extent, inner_extent) = if inner_split {
            (source.extent.ceil_div(factor), Extent::constant(factor))
        } else {
            (Extent::constant(factor), source.extent.ceil_div(factor))
        };
        let outer = self.new_domain(outer_extent, source.iter_type);
        let inner = self.new_domain(inner_extent, source.iter_type);
        let transform = self.push_transform(IdTransform::Split {
            input,
            outer,
            inner,
            factor,
            inner_split,
        });
        trace!("split {} of {} by {} -> {}", input, tv, factor, transform);

        self.tvs[tv.index()].leaf.splice(axis..axis + 1, [outer, inner]);
        Ok(())
    }

    /// Merge leaf `axis` with `axis + 1`
    pub fn merge(&mut self, tv: TensorViewId, axis: usize) -> FusionResult<()> {
        let outer = self.leaf_at(tv, axis)?;
        let inner = self.leaf_at(tv, axis + 1)?;
        let output = self.record_merge(tv, outer, inner)?;
        self.tvs[tv.index()].leaf.splice(axis..axis + 2, [output]);
        Ok(())
    }

    /// Permute the leaf domain: new leaf `i` is old leaf `order[i]`
    pub fn reorder(&mut self, tv: TensorViewId, order: &[usize]) -> FusionResult<()> {
        self.check_tensor(tv)?;
        let leaf = &self.tensor_view(tv).leaf;
        if order.len() != leaf.len() {
            return Err(FusionError::InvalidReorder {
                tv,
                reason: format!("{} positions for {} leaf dims", order.len(), leaf.len()),
            });
        }
        let mut seen = vec![false; leaf.len()];
        for &old in order {
            if old >= leaf.len() || seen[old] {
                return Err(FusionError::InvalidReorder {
                    tv,
                    reason: format!("{:?} is not a permutation", order),
                });
            }
            seen[old] = true;
        }
        let reordered = order.iter().map(|&old| leaf[old]).collect();
        self.tvs[tv.index()].leaf = reordered;
        Ok(())
    }

    /// Share `leaf[..position]` with the consumer loop nest
    pub fn set_compute_at(&mut self, tv: TensorViewId, position: usize) -> FusionResult<()> {
        self.check_tensor(tv)?;
        let ndims = self.tensor_view(tv).n_dims();
        if position > ndims {
            return Err(FusionError::InvalidComputeAt {
                tv,
                position,
                ndims,
            });
        }
        self.tvs[tv.index()].compute_at_position = position;
        Ok(())
    }

    pub fn parallelize(
        &mut self,
        tv: TensorViewId,
        axis: usize,
        parallel_type: ParallelType,
    ) -> FusionResult<()> {
        let id = self.leaf_at(tv, axis)?;
        self.ids[id.index()].parallel_type = parallel_type;
        Ok(())
    }

    /// Mark the loop of leaf `axis` as double buffered
    pub fn double_buffer(&mut self, tv: TensorViewId, axis: usize) -> FusionResult<()> {
        let id = self.leaf_at(tv, axis)?;
        self.ids[id.index()].double_buffered = true;
        Ok(())
    }

    pub fn set_halo_extended(&mut self, tv: TensorViewId, axis: usize) -> FusionResult<()> {
        let id = self.leaf_at(tv, axis)?;
        self.ids[id.index()].halo_extended = true;
        Ok(())
    }

    /// Rebind any registered domain (used by parallel-type propagation)
    pub fn set_parallel_type(
        &mut self,
        id: IterDomainId,
        parallel_type: ParallelType,
    ) -> FusionResult<()> {
        let domain = self
            .ids
            .get_mut(id.index())
            .ok_or(FusionError::UnknownDomain(id))?;
        domain.parallel_type = parallel_type;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Internals
    // ═══════════════════════════════════════════════════════════════════

    fn new_domain(&mut self, extent: Extent, iter_type: IterType) -> IterDomainId {
        let id = IterDomainId::new(self.ids.len() as u32);
        self.ids.push(IterDomain::new(id, extent, iter_type));
        id
    }

    fn new_tensor(&mut self, root: Vec<IterDomainId>) -> TensorViewId {
        let id = TensorViewId::new(self.tvs.len() as u32);
        self.tvs.push(TensorView::new(id, root));
        id
    }

    fn push_expr(
        &mut self,
        kind: OpKind,
        inputs: Vec<TensorViewId>,
        outputs: Vec<TensorViewId>,
    ) -> ExprId {
        let id = ExprId::new(self.exprs.len() as u32);
        for out in &outputs {
            self.tvs[out.index()].definition = Some(id);
        }
        self.exprs.push(Expr {
            id,
            kind,
            inputs,
            outputs,
        });
        id
    }

    fn push_transform(&mut self, transform: IdTransform) -> TransformId {
        let id = TransformId::new(self.transforms.len() as u32);
        for input in transform.inputs() {
            self.uses.insert(input, id);
        }
        for output in transform.outputs() {
            self.ids[output.index()].definition = Some(id);
        }
        self.transforms.push(transform);
        id
    }

    fn record_merge(
        &mut self,
        tv: TensorViewId,
        outer: IterDomainId,
        inner: IterDomainId,
    ) -> FusionResult<IterDomainId> {
        let (o, i) = (self.iter_domain(outer), self.iter_domain(inner));
        let iter_type = match (o.is_broadcast(), i.is_broadcast()) {
            (true, true) => IterType::Broadcast,
            (true, false) => i.iter_type,
            (false, true) => o.iter_type,
            (false, false) if o.iter_type == i.iter_type => o.iter_type,
            (false, false) => {
                return Err(FusionError::IncompatibleMerge {
                    tv,
                    outer: o.to_string(),
                    inner: i.to_string(),
                })
            }
        };
        let extent = o.extent.mul(&i.extent);
        let output = self.new_domain(extent, iter_type);
        let transform = self.push_transform(IdTransform::Merge {
            outer,
            inner,
            output,
        });
        trace!("merge {} and {} of {} -> {}", outer, inner, tv, transform);
        Ok(output)
    }

    fn reduction_root(
        &mut self,
        input: TensorViewId,
        axes: &[usize],
        kind: &'static str,
    ) -> FusionResult<Vec<IterDomainId>> {
        self.check_tensor(input)?;
        let logical = self.logical_domain(input);
        if let Some(axis) = axes.iter().find(|axis| **axis >= logical.len()) {
            return Err(FusionError::malformed(
                kind,
                format!(
                    "axis {} out of range for input {} of rank {}",
                    axis,
                    input,
                    logical.len()
                ),
            ));
        }
        let dims: Vec<(Extent, IterType)> = logical
            .iter()
            .enumerate()
            .map(|(position, id)| {
                let source = self.iter_domain(*id);
                let iter_type = if axes.contains(&position) {
                    IterType::Reduction
                } else if source.is_broadcast() {
                    IterType::Broadcast
                } else {
                    IterType::Iteration
                };
                (source.extent.clone(), iter_type)
            })
            .collect();
        Ok(dims
            .into_iter()
            .map(|(extent, iter_type)| self.new_domain(extent, iter_type))
            .collect())
    }

    fn check_tensor(&self, tv: TensorViewId) -> FusionResult<()> {
        if tv.index() < self.tvs.len() {
            Ok(())
        } else {
            Err(FusionError::UnknownTensor(tv))
        }
    }

    fn leaf_at(&self, tv: TensorViewId, axis: usize) -> FusionResult<IterDomainId> {
        self.check_tensor(tv)?;
        let leaf = &self.tensor_view(tv).leaf;
        leaf.get(axis).copied().ok_or(FusionError::AxisOutOfRange {
            tv,
            axis,
            ndims: leaf.len(),
        })
    }
}
