//! Reconciler configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.tablekeeper/
//!   config.yaml   (optional, every key has a default)
//! ```
//!
//! # API pattern
//!
//! - `load_at(home)`: explicit home; used in tests with `TempDir`
//! - `load()`: derives home from `dirs::home_dir()`, delegates to `load_at`
//! - `load_from(path)`: an explicit file that must exist

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;
use crate::manifest;
use crate::types::TableLifecycle;

/// Delay before a blocked table is looked at again, per blocking status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequeueDelays {
    pub creating_secs: u64,
    pub updating_secs: u64,
    pub deleting_secs: u64,
}

impl Default for RequeueDelays {
    fn default() -> Self {
        Self {
            creating_secs: 5,
            updating_secs: 5,
            deleting_secs: 5,
        }
    }
}

/// Status strings, delays and error matchers injected into the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    pub requeue: RequeueDelays,
    /// Lifecycle statuses that are stable end states.
    pub terminal_statuses: Vec<String>,
    /// Remote error code returned when disabling an already-disabled TTL.
    pub ttl_already_disabled_code: String,
    /// Message prefix accompanying [`Self::ttl_already_disabled_code`].
    pub ttl_already_disabled_prefix: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            requeue: RequeueDelays::default(),
            terminal_statuses: vec![
                TableLifecycle::Archiving.as_str().to_string(),
                TableLifecycle::Archived.as_str().to_string(),
            ],
            ttl_already_disabled_code: "ValidationException".to_string(),
            ttl_already_disabled_prefix: "TimeToLive is already disabled".to_string(),
        }
    }
}

impl ReconcilerConfig {
    /// Requeue delay for a status that forbids mutation, `None` otherwise.
    pub fn requeue_delay(&self, status: TableLifecycle) -> Option<Duration> {
        let secs = match status {
            TableLifecycle::Creating => self.requeue.creating_secs,
            TableLifecycle::Updating => self.requeue.updating_secs,
            TableLifecycle::Deleting => self.requeue.deleting_secs,
            _ => return None,
        };
        Some(Duration::from_secs(secs))
    }

    pub fn is_terminal(&self, table_status: &str) -> bool {
        self.terminal_statuses.iter().any(|s| s == table_status)
    }

    /// `true` when a remote error is the idempotent "TTL already disabled" failure.
    pub fn is_ttl_already_disabled(&self, code: &str, message: &str) -> bool {
        code == self.ttl_already_disabled_code
            && message.starts_with(&self.ttl_already_disabled_prefix)
    }

    /// `<home>/.tablekeeper/config.yaml`. Pure, no I/O.
    pub fn path_at(home: &Path) -> PathBuf {
        home.join(".tablekeeper").join("config.yaml")
    }

    /// Load from `<home>/.tablekeeper/config.yaml`, falling back to defaults
    /// when the file does not exist.
    pub fn load_at(home: &Path) -> Result<Self, ManifestError> {
        let path = Self::path_at(home);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// `load_at` convenience wrapper.
    pub fn load() -> Result<Self, ManifestError> {
        let home = dirs::home_dir().ok_or(ManifestError::NoHomeDir)?;
        Self::load_at(&home)
    }

    /// Load from an explicit path. Returns `ManifestError::NotFound` if absent.
    pub fn load_from(path: &Path) -> Result<Self, ManifestError> {
        manifest::read_document(path)
    }
}
