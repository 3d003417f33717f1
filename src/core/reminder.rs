//! Pending-task reminder digest
//!
//! Builds the message for the daily "what is still open" mail from the raw
//! sheet rows. Delivery and scheduling live outside this crate.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::config::ReminderConfig;
use super::models::{AppError, AppResult, Record};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingTask {
    pub description: String,
    pub date: String,
    pub timing: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderDigest {
    pub to: Option<String>,
    pub subject: String,
    pub body: String,
    pub is_html: bool,
    pub pending: Vec<PendingTask>,
}

/// Build the digest for `records`.
///
/// `Ok(None)` when the sheet has no data rows. Fails when the configured
/// status or description column is missing.
pub fn build_digest(
    records: &[Record],
    config: &ReminderConfig,
) -> AppResult<Option<ReminderDigest>> {
    let first = match records.first() {
        Some(first) => first,
        None => {
            info!("No data rows found, no reminder built");
            return Ok(None);
        }
    };

    for column in [&config.status_column, &config.description_column] {
        if !first.contains_key(column) {
            return Err(AppError::Data(format!("'{}' column not found", column)));
        }
    }

    let pending: Vec<PendingTask> = records
        .iter()
        .filter(|record| {
            let status = record.get_or_empty(&config.status_column).to_lowercase();
            !status.contains("completed") && !record.get_or_empty(&config.description_column).is_empty()
        })
        .map(|record| PendingTask {
            description: record.get_or_empty(&config.description_column).to_string(),
            date: record.get_or_empty(&config.date_column).to_string(),
            timing: record.get_or_empty(&config.timing_column).to_string(),
        })
        .collect();

    info!("Pending tasks found: {}", pending.len());

    let digest = if pending.is_empty() {
        ReminderDigest {
            to: config.recipient_email.clone(),
            subject: "✅ No Pending Tasks (Test Success)".to_string(),
            body: "Great job! You have no pending tasks right now. \
                   This email confirms the reminder system is working."
                .to_string(),
            is_html: false,
            pending,
        }
    } else {
        ReminderDigest {
            to: config.recipient_email.clone(),
            subject: format!("⏳ Pending Work Reminder ({} Tasks)", pending.len()),
            body: render_html(&pending),
            is_html: true,
            pending,
        }
    };

    Ok(Some(digest))
}

fn render_html(pending: &[PendingTask]) -> String {
    let mut html = String::from("<h3>Here are your pending tasks:</h3><ul>");
    for task in pending {
        html.push_str(&format!(
            "<li><strong>{}</strong><br/>\
             <span style='color:#666; font-size:12px'>{} | {}</span></li><br/>",
            escape_html(&task.description),
            escape_html(&task.date),
            escape_html(&task.timing)
        ));
    }
    html.push_str("</ul>");
    html
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::csv_parser::parse_csv_text;

    fn config() -> ReminderConfig {
        ReminderConfig {
            recipient_email: Some("me@example.com".to_string()),
            ..ReminderConfig::default()
        }
    }

    #[test]
    fn test_no_rows() {
        assert_eq!(build_digest(&[], &config()).unwrap(), None);
    }

    #[test]
    fn test_missing_column() {
        let records = parse_csv_text("Date,Task\n1 May 2026,x\n");
        let err = build_digest(&records, &config()).unwrap_err();
        assert!(err.to_string().contains("'Status' column not found"));
    }

    #[test]
    fn test_pending_digest() {
        let records = parse_csv_text(
            "Date,Description,Timing,Status\n\
             1 May 2026,Done thing,09:00,Completed\n\
             1 May 2026,Open <thing>,10:00,In Progress\n\
             ,No status yet,,\n\
             2 May 2026,,,Pending\n",
        );

        let digest = build_digest(&records, &config()).unwrap().unwrap();
        assert_eq!(digest.subject, "⏳ Pending Work Reminder (2 Tasks)");
        assert!(digest.is_html);
        assert_eq!(digest.to.as_deref(), Some("me@example.com"));
        assert_eq!(digest.pending[0].description, "Open <thing>");
        assert_eq!(digest.pending[1].date, "");
        assert!(digest.body.contains("<strong>Open &lt;thing&gt;</strong>"));
        assert!(digest.body.contains("1 May 2026 | 10:00"));
    }

    #[test]
    fn test_all_clear_digest() {
        let records = parse_csv_text("Description,Status\nA,completed\nB,COMPLETED today\n");
        let digest = build_digest(&records, &config()).unwrap().unwrap();
        assert_eq!(digest.subject, "✅ No Pending Tasks (Test Success)");
        assert!(!digest.is_html);
        assert!(digest.pending.is_empty());
    }
}
