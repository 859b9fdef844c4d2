//! `tablekeeper diff`: show the normalized delta between two manifests.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use tablekeeper_sync::{build_delta, Delta};

use super::{load_manifests, table_label};

/// Arguments for `tablekeeper diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Desired table manifest (YAML).
    #[arg(long)]
    pub desired: PathBuf,

    /// Last-observed table manifest (YAML).
    #[arg(long)]
    pub observed: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let (desired, observed) = load_manifests(&self.desired, &self.observed)?;
        let delta = build_delta(Some(&desired), Some(&observed));
        let table = table_label(&desired);

        if self.json {
            return print_json(&table, &delta);
        }
        print_table(&table, &delta);
        Ok(())
    }
}

#[derive(Serialize)]
struct DiffJson<'a> {
    table: &'a str,
    differences: &'a Delta,
}

#[derive(Tabled)]
struct DiffRow {
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "observed")]
    observed: String,
    #[tabled(rename = "desired")]
    desired: String,
}

fn print_json(table: &str, delta: &Delta) -> Result<()> {
    let payload = DiffJson {
        table,
        differences: delta,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize diff JSON")?
    );
    Ok(())
}

fn print_table(table: &str, delta: &Delta) {
    if delta.is_empty() {
        println!("No differences for '{table}'.");
        return;
    }

    println!("{} differences for '{table}'", delta.len());
    let rows: Vec<DiffRow> = delta
        .differences()
        .iter()
        .map(|d| DiffRow {
            path: d.path.to_string(),
            observed: d.observed.to_string(),
            desired: d.desired.to_string(),
        })
        .collect();
    let mut rendered = Table::new(rows);
    rendered.with(Style::rounded());
    println!("{rendered}");
}
