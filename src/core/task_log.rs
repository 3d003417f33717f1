//! Task log state
//!
//! Holds the loaded entries for one view session and keeps them in step with
//! the sheet. Edits are optimistic: local state changes only after the
//! mutation client reports the request as sent, and is never rolled back
//! later because the endpoint's reply is not observed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{info, warn};

use super::models::Record;
use super::mutation_client::{MutationClient, FIRST_DATA_ROW};
use crate::utils::dates::{format_entry_date, parse_entry_date};

pub const DATE_COLUMN: &str = "Date";
pub const DESCRIPTION_COLUMN: &str = "Description";
pub const TIMING_COLUMN: &str = "Timing";
pub const STATUS_COLUMN: &str = "Status";

pub const KNOWN_COLUMNS: [&str; 4] = [DATE_COLUMN, DESCRIPTION_COLUMN, TIMING_COLUMN, STATUS_COLUMN];

/// Physical sheet row for the entry at `position`, `None` past `u32` range
pub fn sheet_row_for(position: usize) -> Option<u32> {
    u32::try_from(position).ok()?.checked_add(FIRST_DATA_ROW)
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    fn needle(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Completed => Some("completed"),
            Self::Pending => Some("pending"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Search, status and ordering applied to the visible list
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewFilter {
    pub search: String,
    pub status: StatusFilter,
    pub sort: SortOrder,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient user-facing message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success() -> Self {
        Self {
            message: "Success".to_string(),
            kind: NoticeKind::Success,
        }
    }

    pub fn failed() -> Self {
        Self::error("Failed")
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskLog {
    entries: Vec<Record>,
}

impl TaskLog {
    /// Build the session list from freshly parsed records.
    ///
    /// Empty dates inherit the closest date above them; rows with none of the
    /// known columns filled are dropped afterwards.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut last_date = String::new();
        let entries = records
            .into_iter()
            .map(|mut record| {
                let date = record.get_or_empty(DATE_COLUMN).trim();
                if !date.is_empty() {
                    last_date = date.to_string();
                } else if record.contains_key(DATE_COLUMN) {
                    record.insert(DATE_COLUMN, last_date.clone());
                }
                record
            })
            .filter(|record| {
                KNOWN_COLUMNS
                    .iter()
                    .any(|column| !record.get_or_empty(column).is_empty())
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[Record] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<&Record> {
        self.entries.get(position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries matching `filter`, paired with their position in the full list
    pub fn filtered(&self, filter: &ViewFilter) -> Vec<(usize, &Record)> {
        let search = filter.search.to_lowercase();
        let mut visible: Vec<(usize, &Record)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                search.is_empty()
                    || record
                        .get_or_empty(DESCRIPTION_COLUMN)
                        .to_lowercase()
                        .contains(&search)
            })
            .filter(|(_, record)| match filter.status.needle() {
                None => true,
                Some(needle) => record
                    .get_or_empty(STATUS_COLUMN)
                    .to_lowercase()
                    .contains(needle),
            })
            .collect();

        visible.sort_by(|(_, a), (_, b)| {
            compare_dates(
                parse_entry_date(a.get_or_empty(DATE_COLUMN)),
                parse_entry_date(b.get_or_empty(DATE_COLUMN)),
                filter.sort,
            )
        });
        visible
    }

    pub fn stats(&self) -> LogStats {
        let completed = self
            .entries
            .iter()
            .filter(|record| is_completed(record))
            .count();
        LogStats {
            total: self.entries.len(),
            completed,
            pending: self.entries.len() - completed,
        }
    }

    /// Send an add and append locally once it is out
    pub async fn add_entry(&mut self, client: &MutationClient, record: Record) -> Notice {
        let outcome = client.create_row(record.clone()).await;
        if !outcome.success {
            return Notice::failed();
        }
        self.entries.push(record);
        info!("Entry added ({} total)", self.entries.len());
        Notice::success()
    }

    /// Send an update for the entry at `position` and replace it locally
    pub async fn save_entry(
        &mut self,
        client: &MutationClient,
        position: usize,
        record: Record,
    ) -> Notice {
        if position >= self.entries.len() {
            warn!("No entry at position {}", position);
            return Notice::failed();
        }

        let Some(sheet_row) = sheet_row_for(position) else {
            warn!("Position {} has no sheet row", position);
            return Notice::failed();
        };

        let outcome = client.update_row(sheet_row, record.clone()).await;
        if !outcome.success {
            return Notice::failed();
        }
        self.entries[position] = record;
        Notice::success()
    }

    /// Send a delete for the entry at `position` and drop it locally
    pub async fn delete_entry(&mut self, client: &MutationClient, position: usize) -> Notice {
        if position >= self.entries.len() {
            warn!("No entry at position {}", position);
            return Notice::failed();
        }

        let Some(sheet_row) = sheet_row_for(position) else {
            warn!("Position {} has no sheet row", position);
            return Notice::failed();
        };

        let outcome = client.delete_row(sheet_row).await;
        if !outcome.success {
            return Notice::failed();
        }
        self.entries.remove(position);
        Notice::success()
    }
}

/// Blank entry with today's date filled in
pub fn new_entry_template(today: NaiveDate) -> Record {
    let mut record = Record::with_capacity(KNOWN_COLUMNS.len());
    record.insert(DATE_COLUMN, format_entry_date(today));
    record.insert(DESCRIPTION_COLUMN, "");
    record.insert(TIMING_COLUMN, "");
    record.insert(STATUS_COLUMN, "");
    record
}

pub fn is_completed(record: &Record) -> bool {
    record
        .get_or_empty(STATUS_COLUMN)
        .to_lowercase()
        .contains("comp")
}

// Undated entries go last in either direction.
fn compare_dates(a: Option<NaiveDate>, b: Option<NaiveDate>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Asc => a.cmp(&b),
            SortOrder::Desc => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EndpointConfig;
    use crate::core::fake_transport::FakeTransport;
    use crate::parsers::csv_parser::parse_csv_text;
    use std::sync::Arc;

    const LOG_CSV: &str = "Date,Description,Timing,Status\n\
        18 October 2026,Write release notes,09:00 AM,Completed\n\
        ,Review PR,11:30 AM,Pending\n\
        20 October 2026,Plan sprint,,In Progress\n\
        ,Retro,04:00 PM,completed\n\
        16 October 2026,Fix flaky test,,pending\n";

    fn log() -> TaskLog {
        TaskLog::from_records(parse_csv_text(LOG_CSV))
    }

    fn client(url: &str, transport: Arc<FakeTransport>) -> MutationClient {
        MutationClient::new(
            EndpointConfig {
                apps_script_url: url.to_string(),
                ..EndpointConfig::default()
            },
            transport,
        )
    }

    fn descriptions(rows: &[(usize, &Record)]) -> Vec<String> {
        rows.iter()
            .map(|(_, r)| r.get_or_empty(DESCRIPTION_COLUMN).to_string())
            .collect()
    }

    #[test]
    fn test_dates_carry_forward() {
        let log = log();
        assert_eq!(log.len(), 5);
        assert_eq!(log.entries()[1].get("Date"), Some("18 October 2026"));
        assert_eq!(log.entries()[3].get("Date"), Some("20 October 2026"));
    }

    #[test]
    fn test_rows_without_known_columns_dropped() {
        let records = parse_csv_text("Date,Notes\n,only a note\n1 May 2026,\n");
        let log = TaskLog::from_records(records);
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].get("Date"), Some("1 May 2026"));
    }

    #[tokio::test]
    async fn test_empty_sheet_row_keeps_later_rows_aligned() {
        let transport = Arc::new(FakeTransport::with_body(""));
        let client = client("https://example.com/exec", transport.clone());
        let mut log = TaskLog::from_records(parse_csv_text(
            "Date,Description,Timing,Status\n1 May 2026,A,,\n,,,\n2 May 2026,B,,\n",
        ));

        // 空行继承上方日期后保留，占据表格第 3 行
        assert_eq!(log.len(), 3);
        assert_eq!(log.entries()[1].get("Date"), Some("1 May 2026"));
        assert_eq!(log.entries()[1].get("Description"), Some(""));

        assert!(log.delete_entry(&client, 2).await.is_success());
        assert_eq!(transport.sent_payloads().await[0]["index"], 4);
    }

    #[test]
    fn test_sheet_row_offset() {
        assert_eq!(sheet_row_for(0), Some(2));
        assert_eq!(sheet_row_for(9), Some(11));
    }

    #[test]
    fn test_sheet_row_out_of_range() {
        // 超出 u32 范围的位置不会被截断成小行号
        let last = (u32::MAX - FIRST_DATA_ROW) as usize;
        assert_eq!(sheet_row_for(last), Some(u32::MAX));
        assert_eq!(sheet_row_for(last + 1), None);
        assert_eq!(sheet_row_for(usize::MAX), None);
    }

    #[test]
    fn test_stats() {
        let stats = log().stats();
        assert_eq!(
            stats,
            LogStats {
                total: 5,
                completed: 2,
                pending: 3
            }
        );
    }

    #[test]
    fn test_default_view_is_newest_first() {
        let log = log();
        let rows = log.filtered(&ViewFilter::default());
        assert_eq!(
            descriptions(&rows),
            vec![
                "Plan sprint",
                "Retro",
                "Write release notes",
                "Review PR",
                "Fix flaky test"
            ]
        );
    }

    #[test]
    fn test_oldest_first() {
        let log = log();
        let filter = ViewFilter {
            sort: SortOrder::Asc,
            ..ViewFilter::default()
        };
        let rows = log.filtered(&filter);
        assert_eq!(rows[0].1.get("Description"), Some("Fix flaky test"));
        assert_eq!(rows[0].0, 4);
    }

    #[test]
    fn test_search_and_status_filters() {
        let log = log();
        let filter = ViewFilter {
            search: "REVIEW".to_string(),
            ..ViewFilter::default()
        };
        assert_eq!(descriptions(&log.filtered(&filter)), vec!["Review PR"]);

        let filter = ViewFilter {
            status: StatusFilter::Pending,
            ..ViewFilter::default()
        };
        assert_eq!(
            descriptions(&log.filtered(&filter)),
            vec!["Review PR", "Fix flaky test"]
        );

        let filter = ViewFilter {
            status: StatusFilter::Completed,
            ..ViewFilter::default()
        };
        assert_eq!(log.filtered(&filter).len(), 2);
    }

    #[test]
    fn test_undated_entries_sort_last() {
        let records = parse_csv_text("Date,Description\nsomeday,A\n2 May 2026,B\n");
        let log = TaskLog::from_records(records);
        for sort in [SortOrder::Asc, SortOrder::Desc] {
            let filter = ViewFilter {
                sort,
                ..ViewFilter::default()
            };
            assert_eq!(log.filtered(&filter)[1].1.get("Description"), Some("A"));
        }
    }

    #[test]
    fn test_new_entry_template() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let template = new_entry_template(today);
        let keys: Vec<&str> = template.keys().collect();
        assert_eq!(keys, KNOWN_COLUMNS.to_vec());
        assert_eq!(template.get("Date"), Some("19 October 2026"));
    }

    #[tokio::test]
    async fn test_add_appends_after_send() {
        let transport = Arc::new(FakeTransport::with_body(""));
        let client = client("https://example.com/exec", transport.clone());
        let mut log = log();

        let entry: Record = [("Date", "21 October 2026"), ("Description", "New")]
            .into_iter()
            .collect();
        let notice = log.add_entry(&client, entry.clone()).await;

        assert!(notice.is_success());
        assert_eq!(log.len(), 6);
        assert_eq!(log.entries()[5], entry);
        assert_eq!(transport.sends.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_save_targets_offset_row() {
        let transport = Arc::new(FakeTransport::with_body(""));
        let client = client("https://example.com/exec", transport.clone());
        let mut log = log();

        let mut edited = log.entries()[2].clone();
        edited.insert("Status", "Completed");
        let notice = log.save_entry(&client, 2, edited).await;

        assert!(notice.is_success());
        assert_eq!(log.entries()[2].get("Status"), Some("Completed"));
        let payloads = transport.sent_payloads().await;
        assert_eq!(payloads[0]["index"], 4);
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let transport = Arc::new(FakeTransport::with_body(""));
        let client = client("https://example.com/exec", transport.clone());
        let mut log = log();

        let notice = log.delete_entry(&client, 0).await;

        assert!(notice.is_success());
        assert_eq!(log.len(), 4);
        assert_eq!(log.entries()[0].get("Description"), Some("Review PR"));
        assert_eq!(transport.sent_payloads().await[0]["index"], 2);
    }

    #[tokio::test]
    async fn test_failure_leaves_state_untouched() {
        let client = client("https://example.com/exec", Arc::new(FakeTransport::offline()));
        let mut log = log();

        let notice = log.delete_entry(&client, 1).await;
        assert_eq!(notice, Notice::failed());
        assert_eq!(log.len(), 5);

        let notice = log.save_entry(&client, 1, Record::new()).await;
        assert!(!notice.is_success());
        assert_eq!(log.entries()[1].get("Description"), Some("Review PR"));
    }

    #[tokio::test]
    async fn test_out_of_range_position() {
        let transport = Arc::new(FakeTransport::with_body(""));
        let client = client("https://example.com/exec", transport.clone());
        let mut log = log();

        assert!(!log.delete_entry(&client, 99).await.is_success());
        assert!(transport.sends.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_mock_mode_updates_locally() {
        let transport = Arc::new(FakeTransport::offline());
        let client = client("", transport);
        let mut log = log();

        assert!(log.delete_entry(&client, 0).await.is_success());
        assert_eq!(log.len(), 4);
    }
}
