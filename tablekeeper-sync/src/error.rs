//! Error types for tablekeeper-sync.

use tablekeeper_core::ManifestError;
use thiserror::Error;

use crate::client::Operation;

/// Structured failure returned by the remote table service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct RemoteError {
    pub code: String,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// All errors that can abort a reconciliation pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A remote call failed, annotated with the operation that issued it.
    #[error("{operation} failed: {source}")]
    Remote {
        operation: Operation,
        #[source]
        source: RemoteError,
    },

    /// Tag changes need the table ARN, which is only known once observed.
    #[error("table '{table}' has no ARN in its observed status")]
    MissingArn { table: String },

    /// Neither `spec.tableName` nor `metadata.name` is set.
    #[error("resource has neither a table name nor a metadata name")]
    MissingTableName,

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Convenience constructor for [`SyncError::Remote`].
pub(crate) fn remote_err(operation: Operation, source: RemoteError) -> SyncError {
    SyncError::Remote { operation, source }
}
