//! One reconciliation pass end to end: read observed state, build the
//! delta, apply what the orchestrator allows.

use std::path::Path;

use tablekeeper_core::{manifest, ReconcilerConfig, Table};

use crate::client::{Operation, TableClient};
use crate::delta::build_delta;
use crate::error::{remote_err, SyncError};
use crate::orchestrator::{update_table, PassOutcome};
use crate::ttl;

/// Fresh observed state: the table description with TTL merged into its spec.
pub fn read_observed<C: TableClient + ?Sized>(
    client: &C,
    table_name: &str,
) -> Result<Table, SyncError> {
    let mut observed = client
        .describe_table(table_name)
        .map_err(|e| remote_err(Operation::DescribeTable, e))?;
    let description = client
        .describe_time_to_live(table_name)
        .map_err(|e| remote_err(Operation::DescribeTimeToLive, e))?;
    observed.spec.time_to_live = Some(ttl::observed_spec(&description));
    tracing::debug!(
        table = table_name,
        status = ?observed.status.table_status,
        "read observed table"
    );
    Ok(observed)
}

/// Run one pass for `desired`.
pub fn run_pass<C: TableClient + ?Sized>(
    client: &C,
    config: &ReconcilerConfig,
    desired: &Table,
) -> Result<PassOutcome, SyncError> {
    let table_name = desired.table_name().ok_or(SyncError::MissingTableName)?;
    let observed = read_observed(client, table_name)?;
    let delta = build_delta(Some(desired), Some(&observed));
    tracing::info!(table = table_name, differences = delta.len(), "built delta");
    update_table(client, config, desired, &observed, &delta)
}

/// Load a desired and an observed manifest.
pub fn load_pair(desired: &Path, observed: &Path) -> Result<(Table, Table), SyncError> {
    Ok((manifest::load_table(desired)?, manifest::load_table(observed)?))
}
