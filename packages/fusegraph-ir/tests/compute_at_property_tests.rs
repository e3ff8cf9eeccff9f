//! Property-based tests for ComputeAtMap
//!
//! Invariants that must hold for every scheduled fusion:
//! - Equivalence: are_mapped is reflexive, symmetric and transitive
//! - Monotonicity: EXACT mapped ⇒ PERMISSIVE mapped
//! - Membership: the concrete id of a class belongs to that class
//! - Coverage: every LOOP class gets exactly one index after allocation
//!
//! Graphs mix broadcast inputs (EXACT and PERMISSIVE differ), fan-out
//! (several terminal candidates per class) and welford siblings.

mod common;

use common::*;
use fusegraph_ir::{ComputeAtMap, DoubleBufferStage, IdMappingMode, IterDomainId};
use proptest::prelude::*;

const MODES: [IdMappingMode; 3] = [
    IdMappingMode::Exact,
    IdMappingMode::Permissive,
    IdMappingMode::Loop,
];

fn registered(map: &ComputeAtMap, mode: IdMappingMode) -> Vec<IterDomainId> {
    map.id_sets(mode).ids().to_vec()
}

fn factor_strategy() -> impl Strategy<Value = i64> {
    prop::sample::select(vec![2i64, 4, 32, 128])
}

fn chain_strategy() -> impl Strategy<Value = (usize, i64, usize)> {
    (1usize..5, factor_strategy(), 0usize..=2)
}

fn dag_strategy() -> impl Strategy<Value = DagShape> {
    (
        1usize..4,
        factor_strategy(),
        0usize..=2,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(n_ops, factor, compute_at, broadcast_input, side_branch, welford_tail)| DagShape {
                n_ops,
                factor,
                compute_at,
                broadcast_input,
                side_branch,
                welford_tail,
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_mappings_are_equivalence_relations(shape in dag_strategy()) {
        let fusion = fixture_scheduled_dag(shape);
        let map = ComputeAtMap::new(&fusion).unwrap();

        for mode in MODES {
            let ids = registered(&map, mode);
            for &a in &ids {
                prop_assert!(map.are_mapped(a, a, mode).unwrap());
                for &b in &ids {
                    let ab = map.are_mapped(a, b, mode).unwrap();
                    prop_assert_eq!(ab, map.are_mapped(b, a, mode).unwrap());
                    if !ab {
                        continue;
                    }
                    for &c in &ids {
                        if map.are_mapped(b, c, mode).unwrap() {
                            prop_assert!(map.are_mapped(a, c, mode).unwrap());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn prop_exact_implies_permissive(shape in dag_strategy()) {
        let fusion = fixture_scheduled_dag(shape);
        let map = ComputeAtMap::new(&fusion).unwrap();

        // Broadcast forwarding only joins classes in PERMISSIVE
        if shape.broadcast_input {
            prop_assert!(map.stats().exact_sets > map.stats().permissive_sets);
        }

        let ids = registered(&map, IdMappingMode::Exact);
        for &a in &ids {
            for &b in &ids {
                if map.are_mapped(a, b, IdMappingMode::Exact).unwrap() {
                    prop_assert!(map.are_mapped(a, b, IdMappingMode::Permissive).unwrap());
                }
            }
        }
    }

    #[test]
    fn prop_concrete_id_is_class_member(shape in dag_strategy()) {
        let fusion = fixture_scheduled_dag(shape);
        let map = ComputeAtMap::new(&fusion).unwrap();

        for mode in MODES {
            for id in registered(&map, mode) {
                let concrete = map.get_concrete_mapped_id(id, mode).unwrap();
                prop_assert!(map.are_mapped(id, concrete, mode).unwrap());
                prop_assert!(map.disjoint_set_of(id, mode).unwrap().contains(&concrete));
            }
        }
    }

    #[test]
    fn prop_loop_classes_follow_compute_at((n_ops, factor, compute_at) in chain_strategy()) {
        let (fusion, tvs) = fixture_pointwise_chain(n_ops, factor, compute_at);
        let mut map = ComputeAtMap::new(&fusion).unwrap();
        map.allocate_index_variables(&fusion).unwrap();

        // Shared positions form one LOOP class per axis, the rest are private
        let shared = compute_at.min(2);
        prop_assert_eq!(map.stats().loop_sets, shared + (2 - shared) * tvs.len());
        prop_assert_eq!(map.stats().index_symbols as usize, map.stats().loop_sets);

        for id in registered(&map, IdMappingMode::Loop) {
            prop_assert!(map.get_index_variable(id, DoubleBufferStage::NotApplicable).is_ok());
        }
    }

    #[test]
    fn prop_every_loop_class_gets_one_index(shape in dag_strategy()) {
        let fusion = fixture_scheduled_dag(shape);
        let mut map = ComputeAtMap::new(&fusion).unwrap();
        map.allocate_index_variables(&fusion).unwrap();

        for id in registered(&map, IdMappingMode::Loop) {
            let index = map.loop_index(id).unwrap();
            let concrete = map.get_concrete_mapped_id(id, IdMappingMode::Loop).unwrap();
            prop_assert_eq!(index, map.loop_index(concrete).unwrap());
        }
    }
}
