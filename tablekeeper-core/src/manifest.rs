//! Table manifest loading.
//!
//! A manifest is one YAML document holding a single [`Table`]. Desired
//! manifests usually carry only `metadata` and `spec`; observed manifests
//! also carry `status`.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::ManifestError;
use crate::types::Table;

/// Load a table manifest.
///
/// Returns `ManifestError::NotFound` if absent,
/// `ManifestError::Parse` (with path + line context) if malformed YAML.
pub fn load_table(path: &Path) -> Result<Table, ManifestError> {
    read_document(path)
}

/// Read and deserialize one YAML document, tagging every failure with `path`.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
