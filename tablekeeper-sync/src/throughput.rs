//! Provisioned throughput sync.

use tablekeeper_core::{ProvisionedThroughput, TableSpec};

use crate::client::{Operation, TableClient, UpdateTableRequest};
use crate::error::{remote_err, SyncError};

/// Capacity with every unset unit sent as `0`.
pub fn units(throughput: &Option<ProvisionedThroughput>) -> ProvisionedThroughput {
    let declared = throughput.clone().unwrap_or_default();
    ProvisionedThroughput::new(
        declared.read_capacity_units.unwrap_or(0),
        declared.write_capacity_units.unwrap_or(0),
    )
}

pub fn capacity(desired: &TableSpec) -> ProvisionedThroughput {
    units(&desired.provisioned_throughput)
}

pub fn request(table_name: &str, desired: &TableSpec) -> UpdateTableRequest {
    UpdateTableRequest {
        provisioned_throughput: Some(capacity(desired)),
        ..UpdateTableRequest::new(table_name)
    }
}

/// Issue an UpdateTable call carrying only the table's provisioned throughput.
pub fn sync<C: TableClient + ?Sized>(
    client: &C,
    table_name: &str,
    desired: &TableSpec,
) -> Result<(), SyncError> {
    let request = request(table_name, desired);
    tracing::info!(
        table = table_name,
        read = ?request.provisioned_throughput.as_ref().and_then(|t| t.read_capacity_units),
        write = ?request.provisioned_throughput.as_ref().and_then(|t| t.write_capacity_units),
        "updating provisioned throughput"
    );
    client
        .update_table(&request)
        .map_err(|e| remote_err(Operation::UpdateTable, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_units_are_sent_as_zero() {
        let spec = TableSpec {
            provisioned_throughput: Some(ProvisionedThroughput {
                read_capacity_units: Some(7),
                write_capacity_units: None,
            }),
            ..TableSpec::default()
        };
        assert_eq!(capacity(&spec), ProvisionedThroughput::new(7, 0));
        assert_eq!(
            capacity(&TableSpec::default()),
            ProvisionedThroughput::new(0, 0)
        );
    }

    #[test]
    fn request_carries_only_throughput() {
        let spec = TableSpec {
            billing_mode: Some("PROVISIONED".into()),
            provisioned_throughput: Some(ProvisionedThroughput::new(10, 20)),
            ..TableSpec::default()
        };
        let request = request("orders", &spec);
        assert_eq!(request.table_name, "orders");
        assert_eq!(
            request.provisioned_throughput,
            Some(ProvisionedThroughput::new(10, 20))
        );
        assert!(request.billing_mode.is_none());
        assert!(request.global_secondary_index_updates.is_empty());
    }
}
