//! # tablekeeper-sync
//!
//! Delta builder, update orchestrator and per-aspect sync adapters.
//!
//! Call [`run_pass`] to read a table's observed state through a
//! [`TableClient`], diff it against the desired table and apply what the
//! current lifecycle status allows. [`build_delta`] and [`update_table`]
//! are exposed separately for callers that already hold both snapshots.

pub mod client;
pub mod delta;
pub mod error;
pub mod indexes;
pub mod orchestrator;
pub mod pipeline;
pub mod recording;
pub mod settings;
pub mod tags;
pub mod throughput;
pub mod ttl;

pub use client::{
    GlobalSecondaryIndexUpdate, Operation, TableClient, TimeToLiveDescription, TimeToLiveStatus,
    UpdateTableRequest, UpdateTimeToLiveRequest,
};
pub use delta::{build_delta, ChangePath, Delta, Difference, FieldLeaf, SpecField};
pub use error::{RemoteError, SyncError};
pub use orchestrator::{update_table, PassOutcome, Requeue};
pub use pipeline::{read_observed, run_pass};
pub use recording::{RecordingClient, RemoteCall};
