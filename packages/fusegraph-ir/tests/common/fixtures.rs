//! Fusion fixtures
//!
//! Small hand-scheduled fusions covering the shapes the compute-at map has
//! to handle: pointwise chains, broadcast merges, multi-output reductions
//! and view reshapes.

use fusegraph_ir::{Extent, Fusion, IterType, TensorViewId};

/// 2-D input followed by `n_ops` pointwise ops, every tensor scheduled as
/// `merge(0); split(0, factor)`, every producer computed at `compute_at`
pub fn fixture_pointwise_chain(
    n_ops: usize,
    factor: i64,
    compute_at: usize,
) -> (Fusion, Vec<TensorViewId>) {
    let mut fusion = Fusion::new();
    let mut tvs = vec![fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i1")])];
    for _ in 0..n_ops {
        let last = *tvs.last().unwrap();
        tvs.push(fusion.pointwise(&[last]).unwrap());
    }
    for tv in &tvs {
        fusion.merge(*tv, 0).unwrap();
        fusion.split(*tv, 0, factor, true).unwrap();
    }
    for tv in &tvs[..tvs.len() - 1] {
        fusion.set_compute_at(*tv, compute_at).unwrap();
    }
    (fusion, tvs)
}

/// Producer/consumer pair sharing the outer loop of `merge(0); split(0, 128)`
pub fn fixture_pointwise_pair() -> (Fusion, TensorViewId, TensorViewId) {
    let (fusion, tvs) = fixture_pointwise_chain(1, 128, 1);
    (fusion, tvs[0], tvs[1])
}

/// `T3 = T1 + T2` with `T1 = broadcast(T0)`, T1 and T3 scheduled alike and
/// T1 computed at the outer loop of T3
///
/// Returns `(fusion, [T0, T1, T2, T3])`.
pub fn fixture_broadcast_add() -> (Fusion, [TensorViewId; 4]) {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[Extent::symbolic("i0")]);
    let tv1 = fusion.broadcast(tv0, &[false, true]).unwrap();
    let tv2 = fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i1")]);
    let tv3 = fusion.pointwise(&[tv1, tv2]).unwrap();
    for tv in [tv1, tv3] {
        fusion.merge(tv, 0).unwrap();
        fusion.split(tv, 0, 128, true).unwrap();
    }
    fusion.set_compute_at(tv1, 1).unwrap();
    (fusion, [tv0, tv1, tv2, tv3])
}

/// Welford over the inner axis of a 2-D input
///
/// Returns `(fusion, input, [avg, var, n])`.
pub fn fixture_welford() -> (Fusion, TensorViewId, [TensorViewId; 3]) {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i1")]);
    let outputs = fusion.welford(tv0, &[1]).unwrap();
    (fusion, tv0, outputs)
}

/// `T2 = T1 + 1` where `T1 = flatten(T0)` merges the two dims of T0
pub fn fixture_view() -> (Fusion, [TensorViewId; 3]) {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i1")]);
    let tv1 = fusion.flatten(tv0, 0).unwrap();
    let tv2 = fusion.pointwise(&[tv1]).unwrap();
    (fusion, [tv0, tv1, tv2])
}

/// Pointwise op over a broadcast-only input
pub fn fixture_broadcast_only() -> (Fusion, TensorViewId, TensorViewId) {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input_with_types(&[(Extent::constant(1), IterType::Broadcast)]);
    let tv1 = fusion.pointwise(&[tv0]).unwrap();
    fusion.set_compute_at(tv0, 1).unwrap();
    (fusion, tv0, tv1)
}

/// `T1 = broadcast(T0)` feeding two consumers that share its outer loop:
/// `T3 = T1 + T2[i0, i1]` and `T5 = T1 + T4`
///
/// With `second_from_broadcast` T4 is `pointwise(T1)` (inner dim stays a
/// broadcast), otherwise T4 is an input `[i0, i3]` whose inner root T3 never
/// sees. T1, T3 and T5 are merged; T1 is computed at 1.
///
/// Returns `(fusion, [T1, T3, T5])`.
pub fn fixture_broadcast_fanout(second_from_broadcast: bool) -> (Fusion, [TensorViewId; 3]) {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[Extent::symbolic("i0")]);
    let tv1 = fusion.broadcast(tv0, &[false, true]).unwrap();
    let tv2 = fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i1")]);
    let tv3 = fusion.pointwise(&[tv1, tv2]).unwrap();
    let tv4 = if second_from_broadcast {
        fusion.pointwise(&[tv1]).unwrap()
    } else {
        fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i3")])
    };
    let tv5 = fusion.pointwise(&[tv1, tv4]).unwrap();
    for tv in [tv1, tv3, tv5] {
        fusion.merge(tv, 0).unwrap();
    }
    fusion.set_compute_at(tv1, 1).unwrap();
    (fusion, [tv1, tv3, tv5])
}

/// Merged `T0` computed at 1 into both a view `T1 = flatten(T0)` and a
/// pointwise `T2` merged alike
///
/// The view's merge is a view-rfactor root of its own, EXACT mapped to the
/// merges of T0 and T2. Returns `(fusion, [T0, T1, T2])`.
pub fn fixture_view_fanout() -> (Fusion, [TensorViewId; 3]) {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i1")]);
    let tv1 = fusion.flatten(tv0, 0).unwrap();
    let tv2 = fusion.pointwise(&[tv0]).unwrap();
    fusion.merge(tv0, 0).unwrap();
    fusion.merge(tv2, 0).unwrap();
    fusion.set_compute_at(tv0, 1).unwrap();
    (fusion, [tv0, tv1, tv2])
}

/// Shape knobs for [`fixture_scheduled_dag`]
#[derive(Debug, Clone, Copy)]
pub struct DagShape {
    pub n_ops: usize,
    pub factor: i64,
    pub compute_at: usize,
    /// Feed a `broadcast` of a 1-D input into the first op
    pub broadcast_input: bool,
    /// Add a second consumer of the 2-D input
    pub side_branch: bool,
    /// End with a welford over the inner axis
    pub welford_tail: bool,
}

/// Pointwise chain over a 2-D input with optional broadcast input, side
/// branch and welford tail
///
/// Every 2-D tensor is scheduled as `merge(0); split(0, factor)` and every
/// producer among them is computed at `compute_at`. Welford outputs are
/// split on their iteration axis only.
pub fn fixture_scheduled_dag(shape: DagShape) -> Fusion {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i1")]);
    let mut scheduled = vec![tv0];
    let mut producers = vec![tv0];

    let mut last = tv0;
    if shape.broadcast_input {
        let input = fusion.new_input(&[Extent::symbolic("i0")]);
        let bcast = fusion.broadcast(input, &[false, true]).unwrap();
        last = fusion.pointwise(&[bcast, tv0]).unwrap();
        scheduled.extend([bcast, last]);
        producers.push(bcast);
    }
    for _ in 0..shape.n_ops {
        let next = fusion.pointwise(&[last]).unwrap();
        if last != tv0 {
            producers.push(last);
        }
        scheduled.push(next);
        last = next;
    }
    if shape.side_branch {
        scheduled.push(fusion.pointwise(&[tv0]).unwrap());
    }
    let welford = if shape.welford_tail {
        Some(fusion.welford(last, &[1]).unwrap())
    } else {
        None
    };

    for tv in &scheduled {
        fusion.merge(*tv, 0).unwrap();
        fusion.split(*tv, 0, shape.factor, true).unwrap();
    }
    for tv in &producers {
        fusion.set_compute_at(*tv, shape.compute_at).unwrap();
    }
    for tv in welford.into_iter().flatten() {
        fusion.split(tv, 0, shape.factor, true).unwrap();
    }
    fusion
}
