//! Global secondary index sync.
//!
//! The remote service accepts one index change per UpdateTable call and
//! blocks further changes until the table is ACTIVE again, so a pass
//! submits a single change: the first removal, else the first update, else
//! the first addition.
//!
//! Only throughput can be updated in place. An index whose key schema or
//! projection changed is deleted; it comes back as an addition on a later
//! pass.

use tablekeeper_core::collection::{diff, equal_key_schema, equal_projection, Keyed};
use tablekeeper_core::{GlobalSecondaryIndex, TableSpec};

use crate::client::{GlobalSecondaryIndexUpdate, Operation, TableClient, UpdateTableRequest};
use crate::error::{remote_err, SyncError};
use crate::throughput;

/// Result of one index sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSync {
    /// The change submitted this pass, if any was pending.
    pub applied: Option<GlobalSecondaryIndexUpdate>,
    /// Changes still pending after this pass.
    pub remaining: usize,
}

/// Every pending index change, in submission priority order.
pub fn pending(
    observed: &[GlobalSecondaryIndex],
    desired: &[GlobalSecondaryIndex],
) -> Vec<GlobalSecondaryIndexUpdate> {
    let result = diff(observed, desired);
    let mut changes = Vec::with_capacity(
        result.removed.len() + result.updated.len() + result.added.len(),
    );

    changes.extend(
        result
            .removed
            .into_iter()
            .map(|index_name| GlobalSecondaryIndexUpdate::Delete { index_name }),
    );

    for index in result.updated {
        let index_name = index.key();
        let replace = observed
            .iter()
            .find(|o| o.key() == index_name)
            .map(|o| {
                !equal_key_schema(&o.key_schema, &index.key_schema)
                    || !equal_projection(&o.projection, &index.projection)
            })
            .unwrap_or(false);
        if replace {
            changes.push(GlobalSecondaryIndexUpdate::Delete { index_name });
        } else {
            changes.push(GlobalSecondaryIndexUpdate::Update {
                index_name,
                provisioned_throughput: throughput::units(&index.provisioned_throughput),
            });
        }
    }

    changes.extend(
        result
            .added
            .into_iter()
            .map(|index| GlobalSecondaryIndexUpdate::Create { index }),
    );
    changes
}

/// UpdateTable call for one index change. Creations carry the desired
/// attribute definitions, which must cover the new index's key attributes.
pub fn request(
    table_name: &str,
    desired: &TableSpec,
    change: GlobalSecondaryIndexUpdate,
) -> UpdateTableRequest {
    let attribute_definitions = match change {
        GlobalSecondaryIndexUpdate::Create { .. } => desired.attribute_definitions.clone(),
        _ => Vec::new(),
    };
    UpdateTableRequest {
        attribute_definitions,
        global_secondary_index_updates: vec![change],
        ..UpdateTableRequest::new(table_name)
    }
}

/// Submit the highest-priority pending index change.
pub fn sync<C: TableClient + ?Sized>(
    client: &C,
    table_name: &str,
    desired: &TableSpec,
    observed: &TableSpec,
) -> Result<IndexSync, SyncError> {
    let mut changes = pending(
        &observed.global_secondary_indexes,
        &desired.global_secondary_indexes,
    )
    .into_iter();
    let Some(change) = changes.next() else {
        return Ok(IndexSync {
            applied: None,
            remaining: 0,
        });
    };
    let remaining = changes.len();

    tracing::info!(
        table = table_name,
        index = change.index_name(),
        remaining,
        "updating global secondary index"
    );
    let request = request(table_name, desired, change.clone());
    client
        .update_table(&request)
        .map_err(|e| remote_err(Operation::UpdateTable, e))?;

    Ok(IndexSync {
        applied: Some(change),
        remaining,
    })
}
