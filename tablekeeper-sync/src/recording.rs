//! In-memory [`TableClient`] that serves a fixed observed table and records
//! every call it receives.
//!
//! Used by `tablekeeper plan` to show the calls a pass would issue without
//! touching a remote service, and by tests to assert on call order.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::Serialize;

use tablekeeper_core::{ResourceArn, Table, Tag};

use crate::client::{
    Operation, TableClient, TimeToLiveDescription, TimeToLiveStatus, UpdateTableRequest,
    UpdateTimeToLiveRequest,
};
use crate::error::RemoteError;

/// One recorded call with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation")]
pub enum RemoteCall {
    #[serde(rename_all = "camelCase")]
    DescribeTable { table_name: String },
    #[serde(rename_all = "camelCase")]
    DescribeTimeToLive { table_name: String },
    UpdateTable(UpdateTableRequest),
    UpdateTimeToLive(UpdateTimeToLiveRequest),
    TagResource { arn: ResourceArn, tags: Vec<Tag> },
    UntagResource { arn: ResourceArn, keys: Vec<String> },
}

impl RemoteCall {
    pub fn operation(&self) -> Operation {
        match self {
            RemoteCall::DescribeTable { .. } => Operation::DescribeTable,
            RemoteCall::DescribeTimeToLive { .. } => Operation::DescribeTimeToLive,
            RemoteCall::UpdateTable(_) => Operation::UpdateTable,
            RemoteCall::UpdateTimeToLive(_) => Operation::UpdateTimeToLive,
            RemoteCall::TagResource { .. } => Operation::TagResource,
            RemoteCall::UntagResource { .. } => Operation::UntagResource,
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            RemoteCall::DescribeTable { .. } | RemoteCall::DescribeTimeToLive { .. }
        )
    }
}

#[derive(Debug)]
pub struct RecordingClient {
    table: Table,
    time_to_live: Option<TimeToLiveDescription>,
    failures: HashMap<Operation, RemoteError>,
    calls: RefCell<Vec<RemoteCall>>,
}

impl RecordingClient {
    /// Serve `observed` from `describe_table`. Unless overridden with
    /// [`Self::with_time_to_live`], TTL is described from `observed.spec`.
    pub fn new(observed: Table) -> Self {
        Self {
            table: observed,
            time_to_live: None,
            failures: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_time_to_live(mut self, description: TimeToLiveDescription) -> Self {
        self.time_to_live = Some(description);
        self
    }

    /// Make every call to `operation` fail with `error`. The call is still
    /// recorded.
    pub fn fail_on(mut self, operation: Operation, error: RemoteError) -> Self {
        self.failures.insert(operation, error);
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.borrow().clone()
    }

    /// Received calls that would change remote state.
    pub fn mutations(&self) -> Vec<RemoteCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    fn record(&self, call: RemoteCall) -> Result<(), RemoteError> {
        let operation = call.operation();
        self.calls.borrow_mut().push(call);
        match self.failures.get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn described_time_to_live(&self) -> TimeToLiveDescription {
        if let Some(description) = &self.time_to_live {
            return description.clone();
        }
        let spec = self.table.spec.time_to_live.clone().unwrap_or_default();
        TimeToLiveDescription {
            attribute_name: spec.attribute_name,
            status: if spec.enabled.unwrap_or(false) {
                TimeToLiveStatus::Enabled
            } else {
                TimeToLiveStatus::Disabled
            },
        }
    }
}

impl TableClient for RecordingClient {
    fn describe_table(&self, table_name: &str) -> Result<Table, RemoteError> {
        self.record(RemoteCall::DescribeTable {
            table_name: table_name.to_string(),
        })?;
        Ok(self.table.clone())
    }

    fn describe_time_to_live(
        &self,
        table_name: &str,
    ) -> Result<TimeToLiveDescription, RemoteError> {
        self.record(RemoteCall::DescribeTimeToLive {
            table_name: table_name.to_string(),
        })?;
        Ok(self.described_time_to_live())
    }

    fn update_table(&self, request: &UpdateTableRequest) -> Result<(), RemoteError> {
        self.record(RemoteCall::UpdateTable(request.clone()))
    }

    fn update_time_to_live(&self, request: &UpdateTimeToLiveRequest) -> Result<(), RemoteError> {
        self.record(RemoteCall::UpdateTimeToLive(request.clone()))
    }

    fn tag_resource(&self, arn: &ResourceArn, tags: &[Tag]) -> Result<(), RemoteError> {
        self.record(RemoteCall::TagResource {
            arn: arn.clone(),
            tags: tags.to_vec(),
        })
    }

    fn untag_resource(&self, arn: &ResourceArn, keys: &[String]) -> Result<(), RemoteError> {
        self.record(RemoteCall::UntagResource {
            arn: arn.clone(),
            keys: keys.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use tablekeeper_core::{TableSpec, TimeToLiveSpecification};

    use super::*;

    #[test]
    fn failing_calls_are_still_recorded() {
        let client = RecordingClient::new(Table::default()).fail_on(
            Operation::TagResource,
            RemoteError::new("AccessDeniedException", "denied"),
        );
        let arn = ResourceArn::from("arn:aws:dynamodb:us-west-2:123456789012:table/orders");

        let err = client
            .tag_resource(&arn, &[Tag::new("env", "prod")])
            .unwrap_err();
        assert_eq!(err.code, "AccessDeniedException");
        assert_eq!(client.calls().len(), 1);
        assert_eq!(client.calls()[0].operation(), Operation::TagResource);
    }

    #[test]
    fn ttl_is_described_from_observed_spec() {
        let table = Table {
            spec: TableSpec {
                time_to_live: Some(TimeToLiveSpecification::new("expires_at", true)),
                ..TableSpec::default()
            },
            ..Table::default()
        };
        let client = RecordingClient::new(table);
        let description = client.describe_time_to_live("orders").expect("describe");
        assert_eq!(description.status, TimeToLiveStatus::Enabled);
        assert_eq!(description.attribute_name.as_deref(), Some("expires_at"));
        assert!(client.mutations().is_empty());
    }

    #[test]
    fn calls_serialize_with_operation_tag() {
        let call = RemoteCall::UntagResource {
            arn: ResourceArn::from("arn:t"),
            keys: vec!["env".into()],
        };
        let json = serde_json::to_value(&call).expect("json");
        assert_eq!(json["operation"], "UntagResource");
        assert_eq!(json["arn"], "arn:t");
        assert_eq!(json["keys"][0], "env");
    }
}
