//! Remote table service seam.
//!
//! The orchestrator only ever talks to the remote service through
//! [`TableClient`]. Every call is blocking; a pass issues its calls one at a
//! time and stops at the first failure.

use std::fmt;

use serde::Serialize;

use tablekeeper_core::{
    AttributeDefinition, GlobalSecondaryIndex, ProvisionedThroughput, ResourceArn,
    SseSpecification, StreamSpecification, Table, Tag, TimeToLiveSpecification,
};

use crate::error::RemoteError;

/// Named remote operations, used for error context and call logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    DescribeTable,
    DescribeTimeToLive,
    UpdateTable,
    UpdateTimeToLive,
    TagResource,
    UntagResource,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::DescribeTable => "DescribeTable",
            Operation::DescribeTimeToLive => "DescribeTimeToLive",
            Operation::UpdateTable => "UpdateTable",
            Operation::UpdateTimeToLive => "UpdateTimeToLive",
            Operation::TagResource => "TagResource",
            Operation::UntagResource => "UntagResource",
        };
        f.write_str(name)
    }
}

/// One secondary-index mutation. The remote API accepts exactly one per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum GlobalSecondaryIndexUpdate {
    Create {
        index: GlobalSecondaryIndex,
    },
    #[serde(rename_all = "camelCase")]
    Update {
        index_name: String,
        provisioned_throughput: ProvisionedThroughput,
    },
    #[serde(rename_all = "camelCase")]
    Delete {
        index_name: String,
    },
}

impl GlobalSecondaryIndexUpdate {
    pub fn index_name(&self) -> &str {
        match self {
            GlobalSecondaryIndexUpdate::Create { index } => {
                index.index_name.as_deref().unwrap_or_default()
            }
            GlobalSecondaryIndexUpdate::Update { index_name, .. }
            | GlobalSecondaryIndexUpdate::Delete { index_name } => index_name,
        }
    }
}

/// Payload of an UpdateTable call; unset fields are left untouched remotely.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTableRequest {
    pub table_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sse_specification: Option<SseSpecification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_specification: Option<StreamSpecification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_class: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attribute_definitions: Vec<AttributeDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub global_secondary_index_updates: Vec<GlobalSecondaryIndexUpdate>,
}

impl UpdateTableRequest {
    pub fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimeToLiveRequest {
    pub table_name: String,
    pub time_to_live: TimeToLiveSpecification,
}

/// Remote TTL state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeToLiveStatus {
    Enabling,
    Enabled,
    Disabling,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeToLiveDescription {
    pub attribute_name: Option<String>,
    pub status: TimeToLiveStatus,
}

/// Remote operations consumed by a reconciliation pass.
pub trait TableClient {
    /// Current remote state of the table, including `status.tableStatus`.
    fn describe_table(&self, table_name: &str) -> Result<Table, RemoteError>;

    /// TTL settings; not part of the table description.
    fn describe_time_to_live(&self, table_name: &str)
        -> Result<TimeToLiveDescription, RemoteError>;

    fn update_table(&self, request: &UpdateTableRequest) -> Result<(), RemoteError>;

    fn update_time_to_live(&self, request: &UpdateTimeToLiveRequest) -> Result<(), RemoteError>;

    fn tag_resource(&self, arn: &ResourceArn, tags: &[Tag]) -> Result<(), RemoteError>;

    fn untag_resource(&self, arn: &ResourceArn, keys: &[String]) -> Result<(), RemoteError>;
}
