//! Keyed, order-independent three-way diff over resource collections.
//!
//! `diff(a, b)` treats `a` as the last-observed collection and `b` as the
//! desired one:
//! - `removed`: keys present in `a` but not in `b` (in `a` order)
//! - `updated`: the `b`-side element for keys in both that are not
//!   semantically equal (in `a` order)
//! - `added`: `b` elements whose key is absent from `a` (in `b` order)
//!
//! Repeated keys are only considered at their first occurrence, so the
//! three key sets never overlap.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use crate::compare::{self, equal_string_sets};
use crate::types::{
    AttributeDefinition, GlobalSecondaryIndex, KeySchemaElement, LocalSecondaryIndex,
    Projection, ProvisionedThroughput, Tag,
};

/// An element with a stable identity and a semantic equality.
pub trait Keyed {
    type Key: Eq + Hash + Clone + Debug;

    fn key(&self) -> Self::Key;

    /// Semantic equality between two elements sharing a key.
    fn same_as(&self, other: &Self) -> bool;
}

/// Result of [`diff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDiff<T: Keyed> {
    pub added: Vec<T>,
    pub updated: Vec<T>,
    pub removed: Vec<T::Key>,
}

impl<T: Keyed> Default for CollectionDiff<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            updated: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<T: Keyed> CollectionDiff<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Compute the three-way diff from `a` (observed) to `b` (desired).
pub fn diff<T: Keyed + Clone>(a: &[T], b: &[T]) -> CollectionDiff<T> {
    let mut desired_by_key: HashMap<T::Key, &T> = HashMap::with_capacity(b.len());
    for element in b {
        desired_by_key.entry(element.key()).or_insert(element);
    }

    let mut result = CollectionDiff::default();
    let mut observed_keys = HashSet::with_capacity(a.len());
    for element in a {
        let key = element.key();
        if !observed_keys.insert(key.clone()) {
            continue;
        }
        match desired_by_key.get(&key) {
            Some(desired) => {
                if !element.same_as(desired) {
                    result.updated.push((*desired).clone());
                }
            }
            None => result.removed.push(key),
        }
    }

    let mut added_keys = HashSet::new();
    for element in b {
        let key = element.key();
        if !observed_keys.contains(&key) && added_keys.insert(key) {
            result.added.push(element.clone());
        }
    }
    result
}

/// Whole-collection equality: a length mismatch is a difference on its own,
/// otherwise the keyed diff must be empty.
pub fn equal_collections<T: Keyed + Clone>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && diff(a, b).is_empty()
}

// ---------------------------------------------------------------------------
// Element comparators
// ---------------------------------------------------------------------------

/// Absent throughput is equivalent to zero read and write capacity.
pub fn equal_throughput(
    a: &Option<ProvisionedThroughput>,
    b: &Option<ProvisionedThroughput>,
) -> bool {
    let a = a.clone().unwrap_or_default();
    let b = b.clone().unwrap_or_default();
    compare::equal(&a.read_capacity_units, &b.read_capacity_units)
        && compare::equal(&a.write_capacity_units, &b.write_capacity_units)
}

/// Projection type plus the non-key attribute set.
pub fn equal_projection(a: &Option<Projection>, b: &Option<Projection>) -> bool {
    let a = a.clone().unwrap_or_default();
    let b = b.clone().unwrap_or_default();
    compare::equal(&a.projection_type, &b.projection_type)
        && equal_string_sets(&a.non_key_attributes, &b.non_key_attributes)
}

pub fn equal_key_schema(a: &[KeySchemaElement], b: &[KeySchemaElement]) -> bool {
    equal_collections(a, b)
}

fn key_of(name: &Option<String>) -> String {
    name.clone().unwrap_or_default()
}

impl Keyed for Tag {
    type Key = String;

    fn key(&self) -> String {
        key_of(&self.key)
    }

    fn same_as(&self, other: &Self) -> bool {
        compare::equal(&self.value, &other.value)
    }
}

impl Keyed for KeySchemaElement {
    type Key = String;

    fn key(&self) -> String {
        key_of(&self.attribute_name)
    }

    fn same_as(&self, other: &Self) -> bool {
        compare::equal(&self.key_type, &other.key_type)
    }
}

impl Keyed for AttributeDefinition {
    type Key = String;

    fn key(&self) -> String {
        key_of(&self.attribute_name)
    }

    fn same_as(&self, other: &Self) -> bool {
        compare::equal(&self.attribute_type, &other.attribute_type)
    }
}

impl Keyed for GlobalSecondaryIndex {
    type Key = String;

    fn key(&self) -> String {
        key_of(&self.index_name)
    }

    fn same_as(&self, other: &Self) -> bool {
        equal_throughput(&self.provisioned_throughput, &other.provisioned_throughput)
            && equal_projection(&self.projection, &other.projection)
            && equal_key_schema(&self.key_schema, &other.key_schema)
    }
}

impl Keyed for LocalSecondaryIndex {
    type Key = String;

    fn key(&self) -> String {
        key_of(&self.index_name)
    }

    fn same_as(&self, other: &Self) -> bool {
        equal_projection(&self.projection, &other.projection)
            && equal_key_schema(&self.key_schema, &other.key_schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gsi(name: &str) -> GlobalSecondaryIndex {
        GlobalSecondaryIndex::named(name)
    }

    #[test]
    fn nil_and_empty_collections_are_equivalent() {
        let empty: Vec<GlobalSecondaryIndex> = vec![];
        assert!(diff(&empty, &empty).is_empty());
        assert!(equal_collections::<Tag>(&[], &[]));
    }

    #[test]
    fn added_index_is_reported_once() {
        let result = diff(&[gsi("i1")], &[gsi("i1"), gsi("i2")]);
        assert_eq!(result.added, vec![gsi("i2")]);
        assert!(result.updated.is_empty());
        assert!(result.removed.is_empty());
    }

    #[test]
    fn removed_indexes_keep_observed_order() {
        let result = diff(&[gsi("i1"), gsi("i2"), gsi("i3")], &[gsi("i1")]);
        assert!(result.added.is_empty());
        assert_eq!(result.removed, vec!["i2".to_string(), "i3".to_string()]);
    }

    #[test]
    fn updated_carries_desired_side() {
        let mut observed = gsi("i1");
        observed.provisioned_throughput = Some(ProvisionedThroughput::new(10, 20));
        let mut desired = gsi("i1");
        desired.provisioned_throughput = Some(ProvisionedThroughput::new(10, 30));

        let result = diff(&[observed], &[desired.clone()]);
        assert_eq!(result.updated, vec![desired]);
    }

    #[test]
    fn key_schema_order_does_not_matter() {
        let a = vec![
            KeySchemaElement::new("pk", "HASH"),
            KeySchemaElement::new("sk", "RANGE"),
        ];
        let b = vec![
            KeySchemaElement::new("sk", "RANGE"),
            KeySchemaElement::new("pk", "HASH"),
        ];
        assert!(equal_key_schema(&a, &b));
    }

    #[test]
    fn key_schema_length_mismatch_is_unequal() {
        let a = vec![KeySchemaElement::new("pk", "HASH")];
        let b = vec![
            KeySchemaElement::new("pk", "HASH"),
            KeySchemaElement::new("pk", "HASH"),
        ];
        assert!(!equal_key_schema(&a, &b));
    }

    #[test]
    fn absent_projection_equals_empty_projection() {
        assert!(equal_projection(&None, &Some(Projection::default())));
        assert!(!equal_projection(
            &None,
            &Some(Projection {
                projection_type: Some("ALL".into()),
                non_key_attributes: None,
            })
        ));
    }

    #[test]
    fn absent_throughput_equals_zero_capacity() {
        assert!(equal_throughput(&None, &Some(ProvisionedThroughput::new(0, 0))));
        assert!(!equal_throughput(&None, &Some(ProvisionedThroughput::new(1, 0))));
    }

    #[test]
    fn tag_value_change_is_an_update() {
        let result = diff(
            &[Tag::new("env", "prod")],
            &[Tag::new("env", "dev"), Tag::new("team", "x")],
        );
        assert_eq!(result.updated, vec![Tag::new("env", "dev")]);
        assert_eq!(result.added, vec![Tag::new("team", "x")]);
        assert!(result.removed.is_empty());
    }

    #[test]
    fn repeated_keys_are_not_double_counted() {
        let result = diff(
            &[Tag::new("env", "prod"), Tag::new("env", "prod")],
            &[Tag::new("team", "x"), Tag::new("team", "y")],
        );
        assert_eq!(result.removed, vec!["env".to_string()]);
        assert_eq!(result.added, vec![Tag::new("team", "x")]);
    }

    #[test]
    fn local_index_projection_change_is_an_update() {
        let observed = LocalSecondaryIndex {
            index_name: Some("by_date".into()),
            key_schema: vec![KeySchemaElement::new("pk", "HASH")],
            projection: Some(Projection {
                projection_type: Some("KEYS_ONLY".into()),
                non_key_attributes: None,
            }),
        };
        let mut desired = observed.clone();
        desired.projection = Some(Projection {
            projection_type: Some("ALL".into()),
            non_key_attributes: None,
        });
        assert_eq!(diff(&[observed], &[desired.clone()]).updated, vec![desired]);
    }
}
