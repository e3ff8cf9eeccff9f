//! IterDomainGraph unit tests
//!
//! Graph construction in isolation: registration, the three partitions,
//! sibling sets and cross-tensor adjacency.

use fusegraph_ir::features::compute_at::{trace_root_ids, IdMappingMode, IterDomainGraph};
use fusegraph_ir::{Extent, Fusion, IterDomainId};

fn scheduled_pair(compute_at: usize) -> (Fusion, Vec<IterDomainId>, Vec<IterDomainId>) {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i1")]);
    let tv1 = fusion.pointwise(&[tv0]).unwrap();
    for tv in [tv0, tv1] {
        fusion.merge(tv, 0).unwrap();
        fusion.split(tv, 0, 4, false).unwrap();
    }
    fusion.set_compute_at(tv0, compute_at).unwrap();
    let p_leaf = fusion.tensor_view(tv0).leaf.clone();
    let c_leaf = fusion.tensor_view(tv1).leaf.clone();
    (fusion, p_leaf, c_leaf)
}

#[test]
fn test_full_compute_at_shares_every_leaf() {
    let (fusion, p_leaf, c_leaf) = scheduled_pair(2);
    let graph = IterDomainGraph::build(&fusion).unwrap();
    let loops = graph.nodes(IdMappingMode::Loop);

    for (p, c) in p_leaf.iter().zip(&c_leaf) {
        assert!(loops.strict_are_mapped(*p, *c));
    }
    assert_eq!(loops.count(), 2);
}

#[test]
fn test_zero_compute_at_shares_nothing() {
    let (fusion, p_leaf, c_leaf) = scheduled_pair(0);
    let graph = IterDomainGraph::build(&fusion).unwrap();

    for (p, c) in p_leaf.iter().zip(&c_leaf) {
        assert!(!graph.loop_nodes().strict_are_mapped(*p, *c));
        assert!(graph.exact_nodes().strict_are_mapped(*p, *c));
    }
    assert_eq!(graph.loop_nodes().count(), 4);
}

#[test]
fn test_outer_split_direction_is_replayed() {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[Extent::symbolic("i0")]);
    let tv1 = fusion.pointwise(&[tv0]).unwrap();
    fusion.split(tv0, 0, 4, false).unwrap();
    fusion.split(tv1, 0, 4, true).unwrap();
    let graph = IterDomainGraph::build(&fusion).unwrap();

    let p_leaf = &fusion.tensor_view(tv0).leaf;
    let c_leaf = &fusion.tensor_view(tv1).leaf;
    assert!(!graph.exact_nodes().strict_are_mapped(p_leaf[0], c_leaf[0]));
    assert!(!graph.exact_nodes().strict_are_mapped(p_leaf[1], c_leaf[1]));
    // Roots still correspond
    assert!(graph.exact_nodes().strict_are_mapped(
        fusion.tensor_view(tv0).root[0],
        fusion.tensor_view(tv1).root[0]
    ));
}

#[test]
fn test_reduction_consumer_maps_reduced_axis() {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i1")]);
    let tv1 = fusion.reduce(tv0, &[1]).unwrap();
    let tv2 = fusion.pointwise(&[tv1]).unwrap();
    let graph = IterDomainGraph::build(&fusion).unwrap();

    let reduced = fusion.tensor_view(tv1).root[1];
    assert!(graph
        .exact_nodes()
        .strict_are_mapped(reduced, fusion.tensor_view(tv0).root[1]));
    // Reduction dims are not visible to consumers
    assert!(graph.consumers_of(reduced).is_empty());
    assert_eq!(
        graph.producers_of(fusion.tensor_view(tv2).root[0]),
        &[fusion.tensor_view(tv1).root[0]]
    );
}

#[test]
fn test_siblings_only_for_multi_output() {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i1")]);
    let [avg, var, _] = fusion.welford(tv0, &[1]).unwrap();
    let tv4 = fusion.pointwise(&[avg]).unwrap();
    let graph = IterDomainGraph::build(&fusion).unwrap();
    let siblings = graph.sibling_sets();

    let avg_root = fusion.tensor_view(avg).root[0];
    assert!(siblings.strict_are_mapped(avg_root, fusion.tensor_view(var).root[0]));
    assert!(!siblings.strict_are_mapped(avg_root, fusion.tensor_view(tv4).root[0]));
    assert!(!siblings.strict_are_mapped(avg_root, fusion.tensor_view(tv0).root[0]));
}

#[test]
fn test_view_rfactor_terminates_root_trace() {
    let mut fusion = Fusion::new();
    let tv0 = fusion.new_input(&[Extent::symbolic("i0"), Extent::symbolic("i1")]);
    let tv1 = fusion.flatten(tv0, 0).unwrap();
    let tv2 = fusion.pointwise(&[tv1]).unwrap();
    fusion.split(tv2, 0, 32, true).unwrap();
    let graph = IterDomainGraph::build(&fusion).unwrap();

    let rfactor = fusion.tensor_view(tv1).maybe_rfactor()[0];
    assert!(graph.is_view_rfactor(rfactor));
    assert_eq!(graph.view_rfactor_ids().len(), 1);

    // From the view tensor's own rfactor the trace stops immediately
    assert_eq!(trace_root_ids(&fusion, &graph, rfactor), vec![rfactor]);
    // The consumer's split traces to its own root, not across tensors
    let leaf = fusion.tensor_view(tv2).leaf[0];
    assert_eq!(
        trace_root_ids(&fusion, &graph, leaf),
        vec![fusion.tensor_view(tv2).root[0]]
    );
}
