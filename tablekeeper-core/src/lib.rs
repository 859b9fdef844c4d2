//! Tablekeeper core library: table resource types, semantic comparison,
//! conditions, configuration and manifest persistence.
//!
//! Public API surface:
//! - [`types`]: the `Table` resource and its nested spec/status structs
//! - [`compare`]: optional-scalar equality with absent ≡ default
//! - [`collection`]: keyed, order-independent three-way collection diff
//! - [`conditions`]: `Synced` / `Terminal` condition setters
//! - [`config`]: [`ReconcilerConfig`]
//! - [`manifest`]: load table manifests
//! - [`error`]: [`ManifestError`]

pub mod collection;
pub mod compare;
pub mod conditions;
pub mod config;
pub mod error;
pub mod manifest;
pub mod types;

pub use collection::{CollectionDiff, Keyed};
pub use config::ReconcilerConfig;
pub use error::ManifestError;
pub use types::{
    AttributeDefinition, BillingMode, Condition, ConditionStatus, ConditionType,
    GlobalSecondaryIndex, KeySchemaElement, LocalSecondaryIndex, ObjectMeta, Projection,
    ProvisionedThroughput, ResourceArn, SseSpecification, StreamSpecification, Table,
    TableLifecycle, TableSpec, TableStatus, Tag, TimeToLiveSpecification,
};
