//! Tag sync.
//!
//! The remote API has no "update tag" call: a changed tag is untagged by
//! key and re-tagged with its desired value. Untag always runs first.

use tablekeeper_core::collection::{diff, Keyed};
use tablekeeper_core::{ResourceArn, Tag};

use crate::client::{Operation, TableClient};
use crate::error::{remote_err, SyncError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagChanges {
    /// Keys to untag, including every changed tag.
    pub removed: Vec<String>,
    /// Tags to (re)apply; changed tags first, then new ones.
    pub added: Vec<Tag>,
}

impl TagChanges {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Tag calls needed to go from `observed` to `desired`.
pub fn plan(observed: &[Tag], desired: &[Tag]) -> TagChanges {
    let result = diff(observed, desired);
    let mut changes = TagChanges {
        removed: result.removed,
        added: Vec::with_capacity(result.updated.len() + result.added.len()),
    };
    for tag in result.updated {
        changes.removed.push(tag.key());
        changes.added.push(tag);
    }
    changes.added.extend(result.added);
    changes
}

/// Issue untag then tag; an empty list skips its call.
pub fn sync<C: TableClient + ?Sized>(
    client: &C,
    arn: &ResourceArn,
    changes: &TagChanges,
) -> Result<(), SyncError> {
    if !changes.removed.is_empty() {
        tracing::info!(arn = %arn, keys = ?changes.removed, "untagging table");
        client
            .untag_resource(arn, &changes.removed)
            .map_err(|e| remote_err(Operation::UntagResource, e))?;
    }
    if !changes.added.is_empty() {
        tracing::info!(arn = %arn, count = changes.added.len(), "tagging table");
        client
            .tag_resource(arn, &changes.added)
            .map_err(|e| remote_err(Operation::TagResource, e))?;
    }
    Ok(())
}
