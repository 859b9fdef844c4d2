//! Time-to-live sync.
//!
//! TTL is not part of the table description; it is read with its own
//! describe call and written with UpdateTimeToLive.

use tablekeeper_core::{ReconcilerConfig, TableSpec, TimeToLiveSpecification};

use crate::client::{
    Operation, TableClient, TimeToLiveDescription, TimeToLiveStatus, UpdateTimeToLiveRequest,
};
use crate::error::{remote_err, SyncError};

/// Map a remote TTL description onto the spec shape. `ENABLING` counts as
/// enabled so an in-flight enable does not register as a difference.
pub fn observed_spec(description: &TimeToLiveDescription) -> TimeToLiveSpecification {
    TimeToLiveSpecification {
        attribute_name: description.attribute_name.clone(),
        enabled: Some(matches!(
            description.status,
            TimeToLiveStatus::Enabled | TimeToLiveStatus::Enabling
        )),
    }
}

/// An undeclared TTL is sent as a disable of the observed attribute.
pub fn request(
    table_name: &str,
    desired: &TableSpec,
    observed: &TableSpec,
) -> UpdateTimeToLiveRequest {
    let time_to_live = match &desired.time_to_live {
        Some(ttl) => TimeToLiveSpecification {
            attribute_name: ttl.attribute_name.clone(),
            enabled: Some(ttl.enabled.unwrap_or(false)),
        },
        None => TimeToLiveSpecification {
            attribute_name: observed
                .time_to_live
                .as_ref()
                .and_then(|t| t.attribute_name.clone()),
            enabled: Some(false),
        },
    };
    UpdateTimeToLiveRequest {
        table_name: table_name.to_string(),
        time_to_live,
    }
}

/// Issue the UpdateTimeToLive call.
///
/// Disabling an already-disabled TTL fails remotely with a validation
/// error; that failure is swallowed. Every other error is returned.
pub fn sync<C: TableClient + ?Sized>(
    client: &C,
    config: &ReconcilerConfig,
    table_name: &str,
    desired: &TableSpec,
    observed: &TableSpec,
) -> Result<(), SyncError> {
    let request = request(table_name, desired, observed);
    let enabling = request.time_to_live.enabled.unwrap_or(false);
    tracing::info!(
        table = table_name,
        enabled = enabling,
        attribute = ?request.time_to_live.attribute_name,
        "updating time to live"
    );

    match client.update_time_to_live(&request) {
        Ok(()) => Ok(()),
        Err(e) if !enabling && config.is_ttl_already_disabled(&e.code, &e.message) => {
            tracing::debug!(table = table_name, "time to live already disabled");
            Ok(())
        }
        Err(e) => Err(remote_err(Operation::UpdateTimeToLive, e)),
    }
}
