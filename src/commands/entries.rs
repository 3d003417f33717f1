//! Entry command handlers
//!
//! Listing, counting and editing the entries of the loaded task log.

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::core::models::Record;
use crate::core::task_log::{new_entry_template, sheet_row_for, LogStats, Notice, ViewFilter};
use crate::AppState;

/// One visible entry and where it lives in the sheet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryView {
    /// Position in the full (unfiltered) list
    pub position: usize,
    pub sheet_row: Option<u32>,
    pub record: Record,
}

/// Entries matching `filter`
pub async fn list_entries(state: &AppState, filter: ViewFilter) -> Result<Vec<EntryView>, String> {
    info!("📋 Listing entries (search: {:?})", filter.search);

    let log = state.task_log.read().await;
    Ok(log
        .filtered(&filter)
        .into_iter()
        .map(|(position, record)| EntryView {
            position,
            sheet_row: sheet_row_for(position),
            record: record.clone(),
        })
        .collect())
}

pub async fn entry_stats(state: &AppState) -> Result<LogStats, String> {
    Ok(state.task_log.read().await.stats())
}

/// Blank entry dated today, for a new-entry form
pub async fn blank_entry() -> Result<Record, String> {
    Ok(new_entry_template(Local::now().date_naive()))
}

pub async fn add_entry(state: &AppState, record: Record) -> Result<Notice, String> {
    info!("➕ Adding entry");

    let notice = state
        .task_log
        .write()
        .await
        .add_entry(&state.mutations, record)
        .await;
    log_notice("add", &notice);
    Ok(notice)
}

pub async fn save_entry(state: &AppState, position: usize, record: Record) -> Result<Notice, String> {
    info!("✏️ Saving entry {}", position);

    let mut log = state.task_log.write().await;
    if position >= log.len() {
        error!("❌ No entry at position {}", position);
        return Err(format!("No entry at position {}", position));
    }

    let notice = log.save_entry(&state.mutations, position, record).await;
    log_notice("save", &notice);
    Ok(notice)
}

pub async fn delete_entry(state: &AppState, position: usize) -> Result<Notice, String> {
    info!("🗑️ Deleting entry {}", position);

    let mut log = state.task_log.write().await;
    if position >= log.len() {
        error!("❌ No entry at position {}", position);
        return Err(format!("No entry at position {}", position));
    }

    let notice = log.delete_entry(&state.mutations, position).await;
    log_notice("delete", &notice);
    Ok(notice)
}

fn log_notice(action: &str, notice: &Notice) {
    if notice.is_success() {
        info!("✅ Entry {} sent", action);
    } else {
        error!("❌ Entry {} failed: {}", action, notice.message);
    }
}
