//! Exhaustive sweeps over small tag universes checking the differencer's
//! set-theoretic guarantees: reflexivity, partition, and no overlap.
//!
//! Each collection is drawn from every subset of a four-key universe with
//! two possible values per key, in two element orders.

use std::collections::BTreeSet;

use rstest::rstest;
use tablekeeper_core::collection::{diff, equal_collections};
use tablekeeper_core::{GlobalSecondaryIndex, KeySchemaElement, ProvisionedThroughput, Tag};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const KEYS: [&str; 4] = ["env", "team", "owner", "cost"];

/// Every collection over `KEYS`: one bit per key for membership, one bit
/// per key for which of two values it holds.
fn universe() -> Vec<Vec<Tag>> {
    let mut all = Vec::new();
    for membership in 0u8..16 {
        for values in 0u8..16 {
            if values & !membership != 0 {
                continue;
            }
            let tags: Vec<Tag> = KEYS
                .iter()
                .enumerate()
                .filter(|(i, _)| membership & (1 << i) != 0)
                .map(|(i, key)| {
                    let value = if values & (1 << i) != 0 { "b" } else { "a" };
                    Tag::new(key, value)
                })
                .collect();
            all.push(tags.clone());
            if tags.len() > 1 {
                all.push(tags.into_iter().rev().collect());
            }
        }
    }
    all
}

fn keys(tags: &[Tag]) -> BTreeSet<String> {
    tags.iter().filter_map(|t| t.key.clone()).collect()
}

fn value_of<'a>(tags: &'a [Tag], key: &str) -> Option<&'a str> {
    tags.iter()
        .find(|t| t.key.as_deref() == Some(key))
        .and_then(|t| t.value.as_deref())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn diff_of_collection_with_itself_is_empty() {
    for a in universe() {
        assert!(diff(&a, &a).is_empty(), "diff(a, a) not empty for {a:?}");
        assert!(equal_collections(&a, &a));
    }
}

#[test]
fn diff_partitions_keys() {
    let universe = universe();
    for a in &universe {
        for b in &universe {
            let result = diff(a, b);
            let ka = keys(a);
            let kb = keys(b);

            let added: BTreeSet<String> = keys(&result.added);
            let updated: BTreeSet<String> = keys(&result.updated);
            let removed: BTreeSet<String> = result.removed.iter().cloned().collect();

            let expected_added: BTreeSet<String> = kb.difference(&ka).cloned().collect();
            let expected_removed: BTreeSet<String> = ka.difference(&kb).cloned().collect();
            let expected_updated: BTreeSet<String> = ka
                .intersection(&kb)
                .filter(|k| value_of(a, k) != value_of(b, k))
                .cloned()
                .collect();

            assert_eq!(added, expected_added, "added for {a:?} -> {b:?}");
            assert_eq!(removed, expected_removed, "removed for {a:?} -> {b:?}");
            assert_eq!(updated, expected_updated, "updated for {a:?} -> {b:?}");

            assert_eq!(result.added.len(), added.len(), "duplicate added entries");
            assert_eq!(result.updated.len(), updated.len(), "duplicate updated entries");
            assert_eq!(result.removed.len(), removed.len(), "duplicate removed keys");

            for tag in &result.updated {
                let key = tag.key.as_deref().unwrap_or_default();
                assert_eq!(
                    tag.value.as_deref(),
                    value_of(b, key),
                    "updated must carry the desired side"
                );
            }
        }
    }
}

#[test]
fn element_order_never_matters() {
    for a in universe() {
        let reversed: Vec<Tag> = a.iter().cloned().rev().collect();
        assert!(diff(&a, &reversed).is_empty());
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

fn index(name: &str, read: i64, keys: &[(&str, &str)]) -> GlobalSecondaryIndex {
    GlobalSecondaryIndex {
        index_name: Some(name.to_string()),
        key_schema: keys
            .iter()
            .map(|(attr, kind)| KeySchemaElement::new(attr, kind))
            .collect(),
        projection: None,
        provisioned_throughput: Some(ProvisionedThroughput::new(read, 5)),
    }
}

#[rstest]
#[case::nil_vs_empty(vec![], vec![], 0, 0, 0)]
#[case::one_added(vec![], vec![index("i1", 5, &[])], 1, 0, 0)]
#[case::one_removed(vec![index("i1", 5, &[])], vec![], 0, 0, 1)]
#[case::throughput_update(vec![index("i1", 5, &[])], vec![index("i1", 10, &[])], 0, 1, 0)]
#[case::key_schema_update(
    vec![index("i1", 5, &[("a", "HASH")])],
    vec![index("i1", 5, &[("a", "HASH"), ("b", "RANGE")])],
    0, 1, 0
)]
#[case::mixed(
    vec![index("i1", 5, &[("a", "HASH")]), index("i2", 5, &[])],
    vec![index("i1", 5, &[("a", "HASH"), ("b", "RANGE")]), index("i3", 10, &[])],
    1, 1, 1
)]
fn index_scenarios(
    #[case] a: Vec<GlobalSecondaryIndex>,
    #[case] b: Vec<GlobalSecondaryIndex>,
    #[case] added: usize,
    #[case] updated: usize,
    #[case] removed: usize,
) {
    let result = diff(&a, &b);
    assert_eq!(result.added.len(), added);
    assert_eq!(result.updated.len(), updated);
    assert_eq!(result.removed.len(), removed);
}
