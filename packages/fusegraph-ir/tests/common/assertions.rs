//! Custom assertions for test verification
//!
//! Domain-specific assertions over `ComputeAtMap` queries.

use fusegraph_ir::{ComputeAtMap, IdMappingMode, IterDomainId};

/// Assert that `a` and `b` are mapped under `mode`
pub fn assert_mapped(map: &ComputeAtMap, a: IterDomainId, b: IterDomainId, mode: IdMappingMode) {
    assert!(
        map.are_mapped(a, b, mode).unwrap(),
        "Expected {a} and {b} to be {mode} mapped. Class of {a}: {:?}",
        map.disjoint_set_of(a, mode).unwrap()
    );
}

/// Assert that `a` and `b` are not mapped under `mode`
pub fn assert_not_mapped(
    map: &ComputeAtMap,
    a: IterDomainId,
    b: IterDomainId,
    mode: IdMappingMode,
) {
    assert!(
        !map.are_mapped(a, b, mode).unwrap(),
        "Expected {a} and {b} not to be {mode} mapped. Class of {a}: {:?}",
        map.disjoint_set_of(a, mode).unwrap()
    );
}

/// Assert that `id`'s representative under `mode` is `expected`
pub fn assert_concrete(
    map: &ComputeAtMap,
    id: IterDomainId,
    mode: IdMappingMode,
    expected: IterDomainId,
) {
    let concrete = map.get_concrete_mapped_id(id, mode).unwrap();
    assert_eq!(
        concrete, expected,
        "Expected {mode} concrete id of {id} to be {expected}, got {concrete}"
    );
}
