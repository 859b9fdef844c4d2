//! Combined settings and stream updates.
//!
//! Billing mode, SSE and table class are accepted together in one
//! UpdateTable call. Streams go through their own call since they count as
//! the pass's single structural change.

use tablekeeper_core::{BillingMode, SseSpecification, StreamSpecification, TableSpec};

use crate::client::{Operation, TableClient, UpdateTableRequest};
use crate::delta::{Delta, SpecField};
use crate::error::{remote_err, SyncError};
use crate::throughput;

const DEFAULT_TABLE_CLASS: &str = "STANDARD";

/// A settings call and the fields it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub request: UpdateTableRequest,
    pub fields: Vec<SpecField>,
}

impl SettingsUpdate {
    /// `true` when the call also sets provisioned throughput, which happens
    /// when switching billing mode back to provisioned.
    pub fn includes_throughput(&self) -> bool {
        self.request.provisioned_throughput.is_some()
    }
}

/// `true` when any field handled by the settings call differs.
pub fn needed(delta: &Delta) -> bool {
    [
        SpecField::BillingMode,
        SpecField::SseSpecification,
        SpecField::TableClass,
    ]
    .into_iter()
    .any(|f| delta.different_at(f))
}

/// Build the settings call carrying exactly the parts that differ.
pub fn plan(table_name: &str, desired: &TableSpec, delta: &Delta) -> SettingsUpdate {
    let mut request = UpdateTableRequest::new(table_name);
    let mut fields = Vec::new();

    if delta.different_at(SpecField::BillingMode) {
        let mode = match desired.billing_mode.as_deref() {
            None | Some("") => BillingMode::Provisioned.as_str().to_string(),
            Some(mode) => mode.to_string(),
        };
        let provisioned = mode == BillingMode::Provisioned.as_str();
        request.billing_mode = Some(mode);
        fields.push(SpecField::BillingMode);

        if provisioned && desired.provisioned_throughput.is_some() {
            request.provisioned_throughput = Some(throughput::capacity(desired));
            fields.push(SpecField::ProvisionedThroughput);
        }
    }

    if delta.different_at(SpecField::SseSpecification) {
        request.sse_specification = Some(sse_payload(desired.sse_specification.as_ref()));
        fields.push(SpecField::SseSpecification);
    }

    if delta.different_at(SpecField::TableClass) {
        let class = match desired.table_class.as_deref() {
            None | Some("") => DEFAULT_TABLE_CLASS,
            Some(class) => class,
        };
        request.table_class = Some(class.to_string());
        fields.push(SpecField::TableClass);
    }

    SettingsUpdate { request, fields }
}

fn sse_payload(desired: Option<&SseSpecification>) -> SseSpecification {
    match desired {
        Some(sse) if sse.enabled == Some(true) => SseSpecification {
            enabled: Some(true),
            sse_type: sse.sse_type.clone(),
            kms_master_key_id: sse.kms_master_key_id.clone(),
        },
        _ => SseSpecification {
            enabled: Some(false),
            ..SseSpecification::default()
        },
    }
}

/// Stream call. The view type is only sent with an enabled stream.
pub fn stream_request(table_name: &str, desired: &TableSpec) -> UpdateTableRequest {
    let enabled = desired
        .stream_specification
        .as_ref()
        .and_then(|s| s.stream_enabled)
        .unwrap_or(false);
    let view_type = if enabled {
        desired
            .stream_specification
            .as_ref()
            .and_then(|s| s.stream_view_type.clone())
    } else {
        None
    };
    UpdateTableRequest {
        stream_specification: Some(StreamSpecification {
            stream_enabled: Some(enabled),
            stream_view_type: view_type,
        }),
        ..UpdateTableRequest::new(table_name)
    }
}

pub fn sync<C: TableClient + ?Sized>(
    client: &C,
    update: &SettingsUpdate,
) -> Result<(), SyncError> {
    tracing::info!(
        table = %update.request.table_name,
        fields = ?update.fields,
        "updating table settings"
    );
    client
        .update_table(&update.request)
        .map_err(|e| remote_err(Operation::UpdateTable, e))
}

pub fn sync_stream<C: TableClient + ?Sized>(
    client: &C,
    table_name: &str,
    desired: &TableSpec,
) -> Result<(), SyncError> {
    let request = stream_request(table_name, desired);
    tracing::info!(table = table_name, "updating stream specification");
    client
        .update_table(&request)
        .map_err(|e| remote_err(Operation::UpdateTable, e))
}
