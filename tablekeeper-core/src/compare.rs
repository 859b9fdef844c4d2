//! Semantic equality for optional scalar fields.
//!
//! The remote API omits any field that holds its default value, so an unset
//! field and a field explicitly set to the type's zero value must compare
//! equal. This module is the only place that rule is encoded.

use std::collections::BTreeSet;

/// Types with a documented zero value the remote API never echoes back.
pub trait ZeroValue {
    fn is_zero(&self) -> bool;
}

impl ZeroValue for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl ZeroValue for i64 {
    fn is_zero(&self) -> bool {
        *self == 0
    }
}

impl ZeroValue for bool {
    fn is_zero(&self) -> bool {
        !*self
    }
}

/// `true` when `a` and `b` are semantically equal.
///
/// An absent side equals the other side when that side is absent or holds
/// its zero value.
pub fn equal<T>(a: &Option<T>, b: &Option<T>) -> bool
where
    T: PartialEq + ZeroValue,
{
    match (a, b) {
        (None, None) => true,
        (None, Some(v)) | (Some(v), None) => v.is_zero(),
        (Some(a), Some(b)) => a == b,
    }
}

/// Like [`equal`], but an absent or empty string stands for `default`.
pub fn equal_or_default(a: &Option<String>, b: &Option<String>, default: &str) -> bool {
    fn resolve<'a>(v: &'a Option<String>, default: &'a str) -> &'a str {
        match v.as_deref() {
            None | Some("") => default,
            Some(v) => v,
        }
    }
    resolve(a, default) == resolve(b, default)
}

/// `true` exactly when one side is absent and the other is present.
pub fn has_nil_difference<T>(a: &Option<T>, b: &Option<T>) -> bool {
    a.is_some() != b.is_some()
}

/// Compare two optional string lists as unordered sets; absent ≡ empty.
pub fn equal_string_sets(a: &Option<Vec<String>>, b: &Option<Vec<String>>) -> bool {
    let a: BTreeSet<&str> = a.iter().flatten().map(String::as_str).collect();
    let b: BTreeSet<&str> = b.iter().flatten().map(String::as_str).collect();
    a == b
}
