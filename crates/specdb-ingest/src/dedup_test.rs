use super::*;

fn entry(spec_value_id: i64, key_id: i64, value: &str) -> VariantSpecEntry {
    VariantSpecEntry {
        spec_value_id,
        key_id,
        value: value.to_owned(),
    }
}

#[test]
fn common_specs_intersects_by_key_and_value() {
    // Variant A: (k1,"v1"), (k2,"v2"); B: (k1,"v1"), (k3,"v3"); C: (k1,"v1").
    // Only (k1,"v1") is shared by all three.
    let sets = vec![
        vec![entry(10, 1, "v1"), entry(11, 2, "v2")],
        vec![entry(10, 1, "v1"), entry(12, 3, "v3")],
        vec![entry(10, 1, "v1")],
    ];

    let common = common_specs(&sets);
    assert_eq!(common.len(), 1);
    assert_eq!(common[0].spec_value_id, 10);
    assert_eq!(common[0].matching_value_ids, vec![10]);
}

#[test]
fn common_specs_empty_when_nothing_shared() {
    let sets = vec![
        vec![entry(10, 1, "v1")],
        vec![entry(11, 2, "v2")],
    ];
    assert!(common_specs(&sets).is_empty());
}

#[test]
fn common_specs_same_value_under_different_key_is_distinct() {
    // "128 GB" as Storage vs "128 GB" as RAM must not match.
    let sets = vec![
        vec![entry(10, 1, "128 GB")],
        vec![entry(11, 2, "128 GB")],
    ];
    assert!(common_specs(&sets).is_empty());
}

#[test]
fn common_specs_zero_and_single_variant_are_noops() {
    assert!(common_specs(&[]).is_empty());
    let single = vec![vec![entry(10, 1, "v1"), entry(11, 2, "v2")]];
    assert!(common_specs(&single).is_empty());
}

#[test]
fn common_specs_resolves_duplicate_ids_to_smallest() {
    // Two spec_values rows carry the same (key, value) content and should not
    // happen given the unique constraint, but tolerated defensively. The
    // smallest id is canonical and both ids are reported for pruning.
    let sets = vec![
        vec![entry(20, 1, "v1")],
        vec![entry(7, 1, "v1")],
        vec![entry(20, 1, "v1")],
    ];

    let common = common_specs(&sets);
    assert_eq!(common.len(), 1);
    assert_eq!(common[0].spec_value_id, 7);
    assert_eq!(common[0].matching_value_ids, vec![7, 20]);
}

#[test]
fn common_specs_output_is_deterministic() {
    let sets = vec![
        vec![entry(3, 2, "b"), entry(1, 1, "a"), entry(5, 3, "c")],
        vec![entry(5, 3, "c"), entry(3, 2, "b"), entry(1, 1, "a")],
    ];

    let first = common_specs(&sets);
    let second = common_specs(&sets);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
    // Ordered by (key_id, value) index order.
    assert_eq!(
        first.iter().map(|c| c.spec_value_id).collect::<Vec<_>>(),
        vec![1, 3, 5]
    );
}
