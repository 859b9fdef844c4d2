pub mod diff;
pub mod plan;

use std::path::Path;

use anyhow::{Context, Result};
use tablekeeper_core::Table;
use tablekeeper_sync::pipeline;

/// Load the desired and observed manifests named on the command line.
pub(crate) fn load_manifests(desired: &Path, observed: &Path) -> Result<(Table, Table)> {
    pipeline::load_pair(desired, observed).with_context(|| {
        format!(
            "failed to load manifests '{}' and '{}'",
            desired.display(),
            observed.display()
        )
    })
}

/// Display name of a table for headings.
pub(crate) fn table_label(table: &Table) -> String {
    table.table_name().unwrap_or("<unnamed>").to_string()
}
