//! Status condition setters.
//!
//! Pure mutations of `Table::status.conditions`. A condition's
//! `last_transition_time` only moves when its status actually changes.

use chrono::Utc;

use crate::types::{Condition, ConditionStatus, ConditionType, Table};

/// Set the `Synced` condition.
pub fn set_synced(table: &mut Table, synced: bool, message: Option<&str>) {
    set_condition(table, ConditionType::Synced, synced.into(), message);
}

/// Set the `Terminal` condition.
pub fn set_terminal(table: &mut Table, terminal: bool, message: Option<&str>) {
    set_condition(table, ConditionType::Terminal, terminal.into(), message);
}

fn set_condition(
    table: &mut Table,
    kind: ConditionType,
    status: ConditionStatus,
    message: Option<&str>,
) {
    let message = message.map(str::to_owned);
    let conditions = &mut table.status.conditions;
    match conditions.iter_mut().find(|c| c.kind == kind) {
        Some(existing) => {
            if existing.status != status {
                existing.status = status;
                existing.last_transition_time = Some(Utc::now());
            }
            existing.message = message;
        }
        None => conditions.push(Condition {
            kind,
            status,
            message,
            last_transition_time: Some(Utc::now()),
        }),
    }
}
