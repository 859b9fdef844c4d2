//! `tablekeeper plan`: run one pass against the observed manifest and show
//! the remote calls it would issue.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use tablekeeper_core::{Condition, ConditionStatus, ReconcilerConfig};
use tablekeeper_sync::{
    run_pass, Operation, PassOutcome, RecordingClient, RemoteCall, RemoteError, SpecField,
};

use super::{load_manifests, table_label};

/// Arguments for `tablekeeper plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Desired table manifest (YAML).
    #[arg(long)]
    pub desired: PathBuf,

    /// Observed table manifest (YAML); served as the remote table.
    #[arg(long)]
    pub observed: PathBuf,

    /// Reconciler config file. Defaults to ~/.tablekeeper/config.yaml when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Answer TTL updates the way the remote does for an already-disabled TTL.
    #[arg(long)]
    pub ttl_already_disabled: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => ReconcilerConfig::load_from(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))?,
            None => ReconcilerConfig::load().context("failed to load ~/.tablekeeper/config.yaml")?,
        };
        tracing::debug!(?config, "loaded reconciler config");
        let (desired, observed) = load_manifests(&self.desired, &self.observed)?;
        let table = table_label(&desired);

        let mut client = RecordingClient::new(observed);
        if self.ttl_already_disabled {
            client = client.fail_on(
                Operation::UpdateTimeToLive,
                RemoteError::new(
                    config.ttl_already_disabled_code.clone(),
                    format!("{} for table {table}", config.ttl_already_disabled_prefix),
                ),
            );
        }

        let outcome = run_pass(&client, &config, &desired)
            .with_context(|| format!("reconciliation pass failed for '{table}'"))?;
        let calls = client.mutations();

        if self.json {
            return print_json(&table, &outcome, &calls);
        }
        print_plan(&table, &outcome, &calls);
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanJson<'a> {
    table: &'a str,
    calls: &'a [RemoteCall],
    requeue: Option<RequeueJson<'a>>,
    applied: Vec<String>,
    deferred: Vec<String>,
    rejected: Vec<String>,
    conditions: &'a [Condition],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequeueJson<'a> {
    after_secs: u64,
    reason: &'a str,
}

#[derive(Tabled)]
struct CallRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "operation")]
    operation: String,
    #[tabled(rename = "payload")]
    payload: String,
}

fn paths(fields: &[SpecField]) -> Vec<String> {
    fields.iter().map(|f| format!("Spec.{f}")).collect()
}

fn print_json(table: &str, outcome: &PassOutcome, calls: &[RemoteCall]) -> Result<()> {
    let payload = PlanJson {
        table,
        calls,
        requeue: outcome.requeue.as_ref().map(|r| RequeueJson {
            after_secs: r.after.as_secs(),
            reason: &r.reason,
        }),
        applied: paths(&outcome.applied),
        deferred: paths(&outcome.deferred),
        rejected: paths(&outcome.rejected),
        conditions: &outcome.resource.status.conditions,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize plan JSON")?
    );
    Ok(())
}

fn print_plan(table: &str, outcome: &PassOutcome, calls: &[RemoteCall]) {
    let status = outcome
        .resource
        .status
        .table_status
        .as_deref()
        .unwrap_or("UNKNOWN");
    println!("Plan for '{table}' (status {status})");

    if calls.is_empty() {
        println!("No remote calls.");
    } else {
        let rows: Vec<CallRow> = calls
            .iter()
            .enumerate()
            .map(|(i, call)| CallRow {
                index: i + 1,
                operation: call.operation().to_string(),
                payload: payload(call),
            })
            .collect();
        let mut rendered = Table::new(rows);
        rendered.with(Style::rounded());
        println!("{rendered}");
    }

    if !outcome.deferred.is_empty() {
        println!("Deferred: {}", paths(&outcome.deferred).join(", "));
    }
    if !outcome.rejected.is_empty() {
        println!(
            "{}",
            format!(
                "Cannot change in place: {}",
                paths(&outcome.rejected).join(", ")
            )
            .red()
        );
    }
    if let Some(requeue) = &outcome.requeue {
        println!(
            "{}",
            format!(
                "Requeue after {}s: {}",
                requeue.after.as_secs(),
                requeue.reason
            )
            .yellow()
        );
    }
    for condition in &outcome.resource.status.conditions {
        println!("{}", condition_line(condition));
    }
}

/// Call payload without the operation tag, as compact JSON.
fn payload(call: &RemoteCall) -> String {
    match serde_json::to_value(call) {
        Ok(serde_json::Value::Object(mut map)) => {
            map.remove("operation");
            serde_json::Value::Object(map).to_string()
        }
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

fn condition_line(condition: &Condition) -> String {
    let status = match condition.status {
        ConditionStatus::True => "True".green(),
        ConditionStatus::False => "False".red(),
        ConditionStatus::Unknown => "Unknown".bright_black(),
    };
    match &condition.message {
        Some(message) => format!("{:?}: {status} ({message})", condition.kind),
        None => format!("{:?}: {status}", condition.kind),
    }
}
