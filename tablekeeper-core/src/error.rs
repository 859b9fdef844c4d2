//! Errors raised while reading manifests and config files.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found at {path}")]
    NotFound { path: PathBuf },

    /// The file exists but could not be read (a directory, no permission).
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed YAML or a shape that does not match the target type.
    /// serde_yaml includes the line and column in `source`.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no home directory to look for ~/.tablekeeper/config.yaml in")]
    NoHomeDir,
}
