//! Delta builder: normalized, field-by-field difference between a desired
//! table and the last-observed one.
//!
//! Entry order is fixed: collections first, then scalar and nested fields
//! in spec order. Nested structures (throughput, SSE, stream, TTL) emit one
//! entry at the parent path followed by one per differing leaf.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use tablekeeper_core::collection::{equal_collections, Keyed};
use tablekeeper_core::compare::{self, equal_or_default, ZeroValue};
use tablekeeper_core::{BillingMode, Table, TableSpec, TimeToLiveSpecification};

const DEFAULT_TABLE_CLASS: &str = "STANDARD";

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Top-level spec fields that can differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SpecField {
    AttributeDefinitions,
    KeySchema,
    GlobalSecondaryIndexes,
    LocalSecondaryIndexes,
    Tags,
    BillingMode,
    ProvisionedThroughput,
    SseSpecification,
    StreamSpecification,
    TableClass,
    TableName,
    TimeToLive,
}

impl SpecField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecField::AttributeDefinitions => "AttributeDefinitions",
            SpecField::KeySchema => "KeySchema",
            SpecField::GlobalSecondaryIndexes => "GlobalSecondaryIndexes",
            SpecField::LocalSecondaryIndexes => "LocalSecondaryIndexes",
            SpecField::Tags => "Tags",
            SpecField::BillingMode => "BillingMode",
            SpecField::ProvisionedThroughput => "ProvisionedThroughput",
            SpecField::SseSpecification => "SSESpecification",
            SpecField::StreamSpecification => "StreamSpecification",
            SpecField::TableClass => "TableClass",
            SpecField::TableName => "TableName",
            SpecField::TimeToLive => "TimeToLive",
        }
    }

    /// Fields the remote service never changes after creation.
    pub fn is_immutable(&self) -> bool {
        matches!(
            self,
            SpecField::KeySchema | SpecField::LocalSecondaryIndexes | SpecField::TableName
        )
    }
}

impl fmt::Display for SpecField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar leaves inside the nested spec structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldLeaf {
    ReadCapacityUnits,
    WriteCapacityUnits,
    SseEnabled,
    SseType,
    KmsMasterKeyId,
    StreamEnabled,
    StreamViewType,
    TtlEnabled,
    TtlAttributeName,
}

impl FieldLeaf {
    pub fn parent(&self) -> SpecField {
        match self {
            FieldLeaf::ReadCapacityUnits | FieldLeaf::WriteCapacityUnits => {
                SpecField::ProvisionedThroughput
            }
            FieldLeaf::SseEnabled | FieldLeaf::SseType | FieldLeaf::KmsMasterKeyId => {
                SpecField::SseSpecification
            }
            FieldLeaf::StreamEnabled | FieldLeaf::StreamViewType => SpecField::StreamSpecification,
            FieldLeaf::TtlEnabled | FieldLeaf::TtlAttributeName => SpecField::TimeToLive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldLeaf::ReadCapacityUnits => "ReadCapacityUnits",
            FieldLeaf::WriteCapacityUnits => "WriteCapacityUnits",
            FieldLeaf::SseEnabled | FieldLeaf::TtlEnabled => "Enabled",
            FieldLeaf::SseType => "SSEType",
            FieldLeaf::KmsMasterKeyId => "KMSMasterKeyID",
            FieldLeaf::StreamEnabled => "StreamEnabled",
            FieldLeaf::StreamViewType => "StreamViewType",
            FieldLeaf::TtlAttributeName => "AttributeName",
        }
    }
}

/// Location of one difference. Renders as `""`, `Spec.X` or `Spec.X.Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangePath {
    /// The whole resource; one side is missing.
    Resource,
    Field(SpecField),
    Leaf(FieldLeaf),
}

impl ChangePath {
    /// Top-level field this path falls under, `None` for [`ChangePath::Resource`].
    pub fn field(&self) -> Option<SpecField> {
        match self {
            ChangePath::Resource => None,
            ChangePath::Field(field) => Some(*field),
            ChangePath::Leaf(leaf) => Some(leaf.parent()),
        }
    }
}

impl fmt::Display for ChangePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangePath::Resource => Ok(()),
            ChangePath::Field(field) => write!(f, "Spec.{field}"),
            ChangePath::Leaf(leaf) => write!(f, "Spec.{}.{}", leaf.parent(), leaf.as_str()),
        }
    }
}

impl Serialize for ChangePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Delta
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Difference {
    pub path: ChangePath,
    pub observed: Value,
    pub desired: Value,
}

/// Ordered set of differences; a path appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Delta {
    differences: Vec<Difference>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a difference. A path already present keeps its first entry.
    pub(crate) fn add<O: Serialize, D: Serialize>(
        &mut self,
        path: ChangePath,
        observed: &O,
        desired: &D,
    ) {
        if self.differences.iter().any(|d| d.path == path) {
            return;
        }
        self.differences.push(Difference {
            path,
            observed: json(observed),
            desired: json(desired),
        });
    }

    pub fn differences(&self) -> &[Difference] {
        &self.differences
    }

    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.differences.len()
    }

    /// `true` when `field` or any of its leaves differs.
    pub fn different_at(&self, field: SpecField) -> bool {
        self.differences
            .iter()
            .any(|d| d.path.field() == Some(field))
    }

    /// `true` when anything outside `fields` differs, including a
    /// whole-resource entry.
    pub fn different_except(&self, fields: &[SpecField]) -> bool {
        self.differences.iter().any(|d| match d.path.field() {
            Some(field) => !fields.contains(&field),
            None => true,
        })
    }

    /// Distinct top-level fields that differ, in entry order.
    pub fn fields(&self) -> Vec<SpecField> {
        let mut fields = Vec::new();
        for field in self.differences.iter().filter_map(|d| d.path.field()) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        fields
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalized copies of `(desired, observed)`; the inputs are left untouched.
///
/// - On-demand desired billing clears throughput on both sides; on-demand
///   observed billing alone clears the observed throughput.
/// - A stream that is not enabled in desired carries no view type.
/// - An undeclared TTL converges to "disabled" on the observed attribute.
pub fn normalize(desired: &TableSpec, observed: &TableSpec) -> (TableSpec, TableSpec) {
    let mut desired = desired.clone();
    let mut observed = observed.clone();

    if desired.is_pay_per_request() {
        desired.provisioned_throughput = None;
        observed.provisioned_throughput = None;
    } else if observed.is_pay_per_request() {
        observed.provisioned_throughput = None;
    }

    let stream_enabled = desired
        .stream_specification
        .as_ref()
        .and_then(|s| s.stream_enabled)
        .unwrap_or(false);
    if !stream_enabled {
        for stream in [&mut desired.stream_specification, &mut observed.stream_specification]
            .into_iter()
            .flatten()
        {
            stream.stream_view_type = None;
        }
    }

    if desired.time_to_live.is_none() {
        if let Some(ttl) = &observed.time_to_live {
            desired.time_to_live = Some(TimeToLiveSpecification {
                attribute_name: ttl.attribute_name.clone(),
                enabled: Some(false),
            });
        }
    }

    (desired, observed)
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Difference between `desired` and the last-observed table.
///
/// When exactly one side is missing the delta holds a single
/// [`ChangePath::Resource`] entry.
pub fn build_delta(desired: Option<&Table>, observed: Option<&Table>) -> Delta {
    let mut delta = Delta::new();
    if compare::has_nil_difference(&desired, &observed) {
        delta.add(ChangePath::Resource, &observed, &desired);
        return delta;
    }
    let (Some(desired), Some(observed)) = (desired, observed) else {
        return delta;
    };

    let (mut b, a) = normalize(&desired.spec, &observed.spec);
    // A desired table may be named only by its metadata.
    if b.table_name.is_none() {
        b.table_name = desired.table_name().map(str::to_owned);
    }

    collection(
        &mut delta,
        SpecField::AttributeDefinitions,
        &a.attribute_definitions,
        &b.attribute_definitions,
    );
    collection(&mut delta, SpecField::KeySchema, &a.key_schema, &b.key_schema);
    collection(
        &mut delta,
        SpecField::GlobalSecondaryIndexes,
        &a.global_secondary_indexes,
        &b.global_secondary_indexes,
    );
    collection(
        &mut delta,
        SpecField::LocalSecondaryIndexes,
        &a.local_secondary_indexes,
        &b.local_secondary_indexes,
    );
    collection(&mut delta, SpecField::Tags, &a.tags, &b.tags);

    if !equal_or_default(&a.billing_mode, &b.billing_mode, BillingMode::Provisioned.as_str()) {
        delta.add(
            ChangePath::Field(SpecField::BillingMode),
            &a.billing_mode,
            &b.billing_mode,
        );
    }

    let (ta, tb) = (
        a.provisioned_throughput.clone().unwrap_or_default(),
        b.provisioned_throughput.clone().unwrap_or_default(),
    );
    nested(
        &mut delta,
        SpecField::ProvisionedThroughput,
        &a.provisioned_throughput,
        &b.provisioned_throughput,
        [
            leaf(FieldLeaf::ReadCapacityUnits, &ta.read_capacity_units, &tb.read_capacity_units),
            leaf(FieldLeaf::WriteCapacityUnits, &ta.write_capacity_units, &tb.write_capacity_units),
        ],
    );

    let (sa, sb) = (
        a.sse_specification.clone().unwrap_or_default(),
        b.sse_specification.clone().unwrap_or_default(),
    );
    nested(
        &mut delta,
        SpecField::SseSpecification,
        &a.sse_specification,
        &b.sse_specification,
        [
            leaf(FieldLeaf::SseEnabled, &sa.enabled, &sb.enabled),
            leaf(FieldLeaf::SseType, &sa.sse_type, &sb.sse_type),
            leaf(FieldLeaf::KmsMasterKeyId, &sa.kms_master_key_id, &sb.kms_master_key_id),
        ],
    );

    let (ra, rb) = (
        a.stream_specification.clone().unwrap_or_default(),
        b.stream_specification.clone().unwrap_or_default(),
    );
    nested(
        &mut delta,
        SpecField::StreamSpecification,
        &a.stream_specification,
        &b.stream_specification,
        [
            leaf(FieldLeaf::StreamEnabled, &ra.stream_enabled, &rb.stream_enabled),
            leaf(FieldLeaf::StreamViewType, &ra.stream_view_type, &rb.stream_view_type),
        ],
    );

    if !equal_or_default(&a.table_class, &b.table_class, DEFAULT_TABLE_CLASS) {
        delta.add(
            ChangePath::Field(SpecField::TableClass),
            &a.table_class,
            &b.table_class,
        );
    }

    if !compare::equal(&a.table_name, &b.table_name) {
        delta.add(
            ChangePath::Field(SpecField::TableName),
            &a.table_name,
            &b.table_name,
        );
    }

    let (la, lb) = (
        a.time_to_live.clone().unwrap_or_default(),
        b.time_to_live.clone().unwrap_or_default(),
    );
    nested(
        &mut delta,
        SpecField::TimeToLive,
        &a.time_to_live,
        &b.time_to_live,
        [
            leaf(FieldLeaf::TtlEnabled, &la.enabled, &lb.enabled),
            leaf(FieldLeaf::TtlAttributeName, &la.attribute_name, &lb.attribute_name),
        ],
    );

    delta
}

fn collection<T: Keyed + Clone + Serialize>(
    delta: &mut Delta,
    field: SpecField,
    observed: &[T],
    desired: &[T],
) {
    if !equal_collections(observed, desired) {
        delta.add(ChangePath::Field(field), &observed, &desired);
    }
}

struct LeafDifference {
    leaf: FieldLeaf,
    observed: Value,
    desired: Value,
}

fn leaf<T>(leaf: FieldLeaf, observed: &Option<T>, desired: &Option<T>) -> Option<LeafDifference>
where
    T: PartialEq + ZeroValue + Serialize,
{
    if compare::equal(observed, desired) {
        return None;
    }
    Some(LeafDifference {
        leaf,
        observed: json(observed),
        desired: json(desired),
    })
}

/// JSON form of a table value. Only `tablekeeper_core` table types reach
/// this: derived `Serialize` over strings, integers, bools, timestamps and
/// lists with no maps, so `to_value` cannot fail on them.
fn json<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn nested<S: Serialize, const N: usize>(
    delta: &mut Delta,
    field: SpecField,
    observed: &Option<S>,
    desired: &Option<S>,
    leaves: [Option<LeafDifference>; N],
) {
    let leaves: Vec<LeafDifference> = leaves.into_iter().flatten().collect();
    if leaves.is_empty() {
        return;
    }
    delta.add(ChangePath::Field(field), observed, desired);
    for l in leaves {
        delta.add(ChangePath::Leaf(l.leaf), &l.observed, &l.desired);
    }
}
