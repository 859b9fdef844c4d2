//! Update orchestrator: decides what a single pass may apply.
//!
//! # Lifecycle gate
//!
//! | Observed status              | Action                                   |
//! |------------------------------|------------------------------------------|
//! | `CREATING` `UPDATING` `DELETING` | Synced=false, requeue after delay    |
//! | terminal (configurable)      | Terminal=true, Synced=true, no requeue   |
//! | anything else                | apply                                    |
//!
//! # Application order
//!
//! 1. TTL
//! 2. tags
//! 3. billing mode / SSE / table class, in one call
//! 4. at most one of: stream, throughput, one index change
//!
//! The first failing remote call aborts the pass. Calls that already
//! succeeded stay applied; the next pass only sees what is left.
//!
//! # Synced condition
//!
//! Set on every pass that reaches the application step: `True` once
//! nothing is left to submit, otherwise `False` naming the fields that
//! cannot change in place and those left for a later pass.

use std::time::Duration;

use serde::Serialize;

use tablekeeper_core::conditions::{set_synced, set_terminal};
use tablekeeper_core::{ReconcilerConfig, Table, TableLifecycle};

use crate::client::{GlobalSecondaryIndexUpdate, TableClient};
use crate::delta::{Delta, SpecField};
use crate::error::SyncError;
use crate::{indexes, settings, tags, throughput, ttl};

/// Ask the scheduler to run another pass after `after`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requeue {
    pub after: Duration,
    pub reason: String,
}

/// Result of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutcome {
    /// Desired resource carrying the observed status and updated conditions.
    pub resource: Table,
    pub requeue: Option<Requeue>,
    /// Fields whose change was submitted this pass.
    pub applied: Vec<SpecField>,
    /// Differing fields left for a later pass.
    pub deferred: Vec<SpecField>,
    /// Differing fields the remote table cannot change in place.
    pub rejected: Vec<SpecField>,
}

/// Run one pass of updates for `desired` against `observed`.
pub fn update_table<C: TableClient + ?Sized>(
    client: &C,
    config: &ReconcilerConfig,
    desired: &Table,
    observed: &Table,
    delta: &Delta,
) -> Result<PassOutcome, SyncError> {
    let mut resource = snapshot(desired, observed);
    let (rejected, mutable): (Vec<SpecField>, Vec<SpecField>) =
        delta.fields().into_iter().partition(SpecField::is_immutable);
    let label = desired.table_name().unwrap_or_default().to_string();

    if let Some(lifecycle) = observed.status.lifecycle() {
        if let Some(after) = config.requeue_delay(lifecycle) {
            let reason = blocked_message(lifecycle);
            tracing::info!(table = %label, status = %lifecycle, ?after, "{reason}");
            set_synced(&mut resource, false, Some(&reason));
            return Ok(PassOutcome {
                resource,
                requeue: Some(Requeue { after, reason }),
                applied: Vec::new(),
                deferred: mutable,
                rejected,
            });
        }
    }

    if let Some(status) = observed.status.table_status.as_deref() {
        if config.is_terminal(status) {
            let message = format!("table is in '{status}' status");
            tracing::info!(table = %label, status, "table reached a terminal status");
            set_terminal(&mut resource, true, Some(&message));
            set_synced(&mut resource, true, None);
            return Ok(PassOutcome {
                resource,
                requeue: None,
                applied: Vec::new(),
                deferred: mutable,
                rejected,
            });
        }
    }

    let table_name = desired.table_name().ok_or(SyncError::MissingTableName)?;
    for field in &rejected {
        tracing::warn!(table = table_name, field = %field, "field cannot be changed in place");
    }

    let mut applied = Vec::new();

    if delta.different_at(SpecField::TimeToLive) {
        ttl::sync(client, config, table_name, &desired.spec, &observed.spec)?;
        applied.push(SpecField::TimeToLive);
    }

    if delta.different_at(SpecField::Tags) {
        let arn = observed
            .status
            .arn()
            .or_else(|| desired.status.arn())
            .ok_or_else(|| SyncError::MissingArn {
                table: table_name.to_string(),
            })?;
        let changes = tags::plan(&observed.spec.tags, &desired.spec.tags);
        tags::sync(client, arn, &changes)?;
        applied.push(SpecField::Tags);
    }

    let mut throughput_covered = false;
    if settings::needed(delta) {
        let update = settings::plan(table_name, &desired.spec, delta);
        settings::sync(client, &update)?;
        throughput_covered = update.includes_throughput();
        applied.extend(update.fields);
    }

    if delta.different_except(&[SpecField::Tags, SpecField::TimeToLive]) {
        if delta.different_at(SpecField::StreamSpecification) {
            settings::sync_stream(client, table_name, &desired.spec)?;
            applied.push(SpecField::StreamSpecification);
        } else if delta.different_at(SpecField::ProvisionedThroughput) {
            if !throughput_covered {
                throughput::sync(client, table_name, &desired.spec)?;
                applied.push(SpecField::ProvisionedThroughput);
            }
        } else if delta.different_at(SpecField::GlobalSecondaryIndexes) {
            let outcome = indexes::sync(client, table_name, &desired.spec, &observed.spec)?;
            if outcome.remaining == 0 {
                applied.push(SpecField::GlobalSecondaryIndexes);
            }
            let created = matches!(
                outcome.applied,
                Some(GlobalSecondaryIndexUpdate::Create { .. })
            );
            if created && delta.different_at(SpecField::AttributeDefinitions) {
                applied.push(SpecField::AttributeDefinitions);
            }
        }
    }

    let deferred: Vec<SpecField> = mutable
        .into_iter()
        .filter(|f| !applied.contains(f))
        .collect();

    match unsynced_message(&rejected, &deferred) {
        Some(message) => set_synced(&mut resource, false, Some(&message)),
        None => set_synced(&mut resource, true, None),
    }

    tracing::debug!(table = table_name, ?applied, ?deferred, ?rejected, "pass complete");
    Ok(PassOutcome {
        resource,
        requeue: None,
        applied,
        deferred,
        rejected,
    })
}

fn unsynced_message(rejected: &[SpecField], deferred: &[SpecField]) -> Option<String> {
    let list = |fields: &[SpecField]| {
        fields
            .iter()
            .map(|f| format!("Spec.{f}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut parts = Vec::new();
    if !rejected.is_empty() {
        parts.push(format!("fields cannot be changed in place: {}", list(rejected)));
    }
    if !deferred.is_empty() {
        parts.push(format!("changes pending for a later pass: {}", list(deferred)));
    }
    (!parts.is_empty()).then(|| parts.join("; "))
}

/// Desired spec with the observed status; desired's own conditions are kept.
fn snapshot(desired: &Table, observed: &Table) -> Table {
    let mut resource = desired.clone();
    let conditions = std::mem::take(&mut resource.status.conditions);
    resource.status = observed.status.clone();
    resource.status.conditions = conditions;
    resource
}

fn blocked_message(lifecycle: TableLifecycle) -> String {
    let verb = match lifecycle {
        TableLifecycle::Creating => "created",
        TableLifecycle::Deleting => "deleted",
        _ => "updated",
    };
    format!("table is currently being {verb}")
}
