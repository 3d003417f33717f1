//! Import command handlers
//!
//! Loading the task log from the sheet export or from a local CSV file, and
//! writing the loaded entries back out as CSV.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info};

use crate::core::models::{AppError, AppResult, Record};
use crate::core::task_log::{LogStats, TaskLog};
use crate::parsers::csv_parser::{headers_of, parse_csv_with_stats, records_to_csv, ParseStats};
use crate::utils::encoding::decode_text;
use crate::AppState;

/// Result of replacing the session's entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadResult {
    /// Where the rows came from
    pub source: String,
    /// Parser statistics, when the raw text was read locally
    pub parse: Option<ParseStats>,
    pub stats: LogStats,
}

/// First rows of a local CSV file, without touching the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvPreview {
    pub headers: Vec<String>,
    pub encoding: String,
    pub stats: ParseStats,
    pub rows: Vec<Record>,
}

/// Reload the task log from the sheet export.
///
/// A failed fetch leaves an empty log behind, the same as an empty sheet.
pub async fn load_entries(state: &AppState) -> Result<LoadResult, String> {
    info!("📥 Loading entries from sheet");

    let records = state.source.fetch_records_or_empty().await;
    let log = TaskLog::from_records(records);
    let stats = log.stats();
    *state.task_log.write().await = log;

    info!("✅ Loaded {} entries", stats.total);
    Ok(LoadResult {
        source: "sheet".to_string(),
        parse: None,
        stats,
    })
}

/// Replace the task log with the rows of a local CSV file
pub async fn import_csv_file(state: &AppState, file_path: String) -> Result<LoadResult, String> {
    info!("📁 Importing file: {}", file_path);

    match import_csv_file_impl(state, &file_path).await {
        Ok(result) => {
            info!(
                "✅ Successfully imported {} entries from {}",
                result.stats.total, file_path
            );
            Ok(result)
        }
        Err(e) => {
            error!("❌ Failed to import file: {}", e);
            Err(e.to_string())
        }
    }
}

/// Write the current entries to `file_path` as CSV
pub async fn export_entries(state: &AppState, file_path: String) -> Result<usize, String> {
    info!("💾 Exporting entries to: {}", file_path);

    match export_entries_impl(state, &file_path).await {
        Ok(count) => {
            info!("✅ Exported {} entries", count);
            Ok(count)
        }
        Err(e) => {
            error!("❌ Failed to export entries: {}", e);
            Err(e.to_string())
        }
    }
}

/// Parse a local CSV file and keep the first `max_rows` records
pub async fn preview_csv_file(
    file_path: String,
    max_rows: Option<usize>,
) -> Result<CsvPreview, String> {
    info!("👀 Previewing file: {}", file_path);

    match preview_csv_file_impl(&file_path, max_rows.unwrap_or(10)).await {
        Ok(preview) => Ok(preview),
        Err(e) => {
            error!("❌ Failed to preview file: {}", e);
            Err(e.to_string())
        }
    }
}

async fn read_csv_file(file_path: &str) -> AppResult<(String, &'static str)> {
    if !Path::new(file_path).exists() {
        return Err(AppError::Data(format!("File not found: {}", file_path)));
    }

    let bytes = tokio::fs::read(file_path).await?;
    let (text, encoding) = decode_text(&bytes);
    Ok((text, encoding.name()))
}

async fn preview_csv_file_impl(file_path: &str, max_rows: usize) -> AppResult<CsvPreview> {
    let (text, encoding) = read_csv_file(file_path).await?;
    let (mut records, stats) = parse_csv_with_stats(Some(&text));

    let headers = headers_of(&records);
    records.truncate(max_rows);

    Ok(CsvPreview {
        headers,
        encoding: encoding.to_string(),
        stats,
        rows: records,
    })
}

async fn import_csv_file_impl(state: &AppState, file_path: &str) -> AppResult<LoadResult> {
    let (text, _) = read_csv_file(file_path).await?;
    let (records, parse) = parse_csv_with_stats(Some(&text));

    let log = TaskLog::from_records(records);
    let stats = log.stats();
    *state.task_log.write().await = log;

    Ok(LoadResult {
        source: file_path.to_string(),
        parse: Some(parse),
        stats,
    })
}

async fn export_entries_impl(state: &AppState, file_path: &str) -> AppResult<usize> {
    let csv = {
        let log = state.task_log.read().await;
        let entries = log.entries();
        records_to_csv(&headers_of(entries), entries)?
    };

    tokio::fs::write(file_path, csv).await?;
    Ok(state.task_log.read().await.len())
}
