//! Transform replay unit tests
//!
//! Root correspondence and best-effort replay through longer schedules.

use fusegraph_ir::features::transform_replay::{
    history_transforms, ids_between, BestEffortReplay, Forwarding, IdMap, PairwiseRootDomainMap,
};
use fusegraph_ir::{Extent, Fusion};
use pretty_assertions::assert_eq;

#[test]
fn test_deep_schedule_replays_fully() {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[
        Extent::symbolic("i0"),
        Extent::symbolic("i1"),
        Extent::symbolic("i2"),
    ]);
    let tv1 = fusion.pointwise(&[tv0]).unwrap();
    for tv in [tv0, tv1] {
        fusion.merge(tv, 1).unwrap();
        fusion.split(tv, 1, 32, true).unwrap();
        fusion.split(tv, 0, 2, false).unwrap();
        fusion.reorder(tv, &[1, 0, 2, 3]).unwrap();
    }

    let map = BestEffortReplay::replay_producer_as_consumer(
        &fusion,
        tv0,
        tv1,
        &PairwiseRootDomainMap::new(tv0, tv1),
    )
    .unwrap()
    .into_map();

    let p_leaf = fusion.tensor_view(tv0).leaf.clone();
    let c_leaf = fusion.tensor_view(tv1).leaf.clone();
    for (c, p) in c_leaf.iter().zip(&p_leaf) {
        assert_eq!(map.get(*c), Some(*p));
    }
}

#[test]
fn test_partial_replay_keeps_matched_prefix() {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i1")]);
    let tv1 = fusion.pointwise(&[tv0]).unwrap();
    fusion.merge(tv0, 0).unwrap();
    fusion.split(tv0, 0, 16, true).unwrap();
    fusion.merge(tv1, 0).unwrap();
    fusion.split(tv1, 0, 8, true).unwrap();

    let map = BestEffortReplay::replay_producer_as_consumer(
        &fusion,
        tv0,
        tv1,
        &PairwiseRootDomainMap::new(tv0, tv1),
    )
    .unwrap()
    .into_map();

    let split_input = |tv| {
        let outer = fusion.tensor_view(tv).leaf[0];
        fusion.definition_of(outer).unwrap().inputs()[0]
    };
    let (merged_c, merged_p) = (split_input(tv1), split_input(tv0));
    assert_eq!(map.get(merged_c), Some(merged_p));
    // Roots + merge output only
    assert_eq!(map.len(), 3);
}

#[test]
fn test_manual_root_map_replay() {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[Extent::symbolic("i0")]);
    let tv1 = fusion.new_input(&[Extent::symbolic("i0")]);
    fusion.split(tv0, 0, 4, true).unwrap();
    fusion.split(tv1, 0, 4, true).unwrap();

    let root: IdMap = [(fusion.tensor_view(tv1).root[0], fusion.tensor_view(tv0).root[0])]
        .into_iter()
        .collect();
    let leaf = fusion.tensor_view(tv1).leaf.clone();
    let replay = BestEffortReplay::new(&fusion, &leaf, root, Forwarding::Disabled);

    assert_eq!(replay.get_replay().len(), 3);
    assert!(replay.forwarded_ids().is_empty());
    let pairs: Vec<_> = replay.get_replay().iter().collect();
    assert_eq!(pairs[0].0, fusion.tensor_view(tv1).root[0]);
}

#[test]
fn test_history_and_closure_agree() {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i1")]);
    fusion.split(tv0, 1, 8, true).unwrap();
    fusion.merge(tv0, 0).unwrap();
    fusion.split(tv0, 0, 2, true).unwrap();
    let view = fusion.tensor_view(tv0).clone();

    let history = history_transforms(&fusion, &view.leaf);
    assert_eq!(history.len(), 3);

    let between = ids_between(&fusion, &view.root, &view.leaf);
    let produced: usize = history
        .iter()
        .map(|transform| fusion.transform(*transform).outputs().len())
        .sum();
    assert_eq!(between.len(), view.root.len() + produced);
}
