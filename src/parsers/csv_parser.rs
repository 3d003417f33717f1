//! CSV parsing for spreadsheet exports
//!
//! Turns the text of a sheet's CSV export into header-keyed [`Record`]s.
//!
//! The reader is deliberately permissive: it never rejects input. Ragged rows
//! are padded or truncated to the header width, an unterminated quote at the
//! end of the text keeps whatever it accumulated, and empty lines are dropped.
//! Rows of empty cells (`,,,`) are kept as empty records.
//!
//! ## Rules
//!
//! - `\r`, `\n` and `\r\n` all end a row, except inside quotes
//! - `,` separates fields, except inside quotes
//! - `"` toggles quoting; `""` inside quotes is a literal `"`
//! - every header and value is trimmed after unquoting

use crate::core::models::{AppError, AppResult, Record};
use csv::{Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Row accounting for one parse
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseStats {
    /// Number of header columns
    pub header_count: usize,
    /// Data rows seen after the header
    pub total_rows: usize,
    /// Rows emitted as records
    pub parsed_rows: usize,
    /// Empty lines dropped
    pub skipped_rows: usize,
    /// Rows whose width differed from the header
    pub ragged_rows: usize,
}

/// Parse CSV export text into records.
///
/// `None` and `""` both yield an empty list.
pub fn parse_csv(raw: Option<&str>) -> Vec<Record> {
    parse_csv_with_stats(raw).0
}

/// Shorthand for [`parse_csv`] on text that is known to be present.
pub fn parse_csv_text(raw: &str) -> Vec<Record> {
    parse_csv(Some(raw))
}

/// Parse CSV export text, also reporting what happened to each row.
pub fn parse_csv_with_stats(raw: Option<&str>) -> (Vec<Record>, ParseStats) {
    let mut stats = ParseStats::default();
    let text = match raw {
        Some(text) if !text.is_empty() => text,
        _ => return (Vec::new(), stats),
    };

    let mut rows = split_rows(text).into_iter();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.fields.iter().map(|h| trim_field(h).to_string()).collect(),
        None => return (Vec::new(), stats),
    };
    stats.header_count = headers.len();

    let mut records = Vec::new();
    for row in rows {
        stats.total_rows += 1;

        if is_blank_line(&row) {
            stats.skipped_rows += 1;
            continue;
        }
        if row.fields.len() != headers.len() {
            stats.ragged_rows += 1;
        }

        records.push(zip_row(&headers, &row.fields));
    }
    stats.parsed_rows = records.len();

    debug!(
        "CSV parsed: {} columns, {} rows, {} records, {} blank, {} ragged",
        stats.header_count,
        stats.total_rows,
        stats.parsed_rows,
        stats.skipped_rows,
        stats.ragged_rows
    );

    (records, stats)
}

/// One physical row of raw (untrimmed) fields
struct RawRow {
    fields: Vec<String>,
    /// Whether any quote appeared on the row
    quoted: bool,
}

/// Split text into physical rows in a single pass.
fn split_rows(text: &str) -> Vec<RawRow> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    field.push(QUOTE);
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            QUOTE => {
                in_quotes = true;
                quoted = true;
            }
            DELIMITER => row.push(std::mem::take(&mut field)),
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                rows.push(RawRow {
                    fields: std::mem::take(&mut row),
                    quoted: std::mem::take(&mut quoted),
                });
            }
            _ => field.push(c),
        }
    }

    // Unterminated last line, or a quote left open at EOF
    if !field.is_empty() || !row.is_empty() || quoted {
        row.push(field);
        rows.push(RawRow {
            fields: row,
            quoted,
        });
    }

    rows
}

fn zip_row(headers: &[String], row: &[String]) -> Record {
    let mut record = Record::with_capacity(headers.len());
    for (index, header) in headers.iter().enumerate() {
        let value = row.get(index).map(|v| trim_field(v)).unwrap_or("");
        record.insert(header.as_str(), value);
    }
    record
}

/// An entirely empty physical line. Rows such as `,,,` are real (empty)
/// sheet rows and are kept so later records stay aligned with the sheet.
fn is_blank_line(row: &RawRow) -> bool {
    !row.quoted && row.fields.len() == 1 && row.fields[0].is_empty()
}

/// Whitespace trim that also drops a stray byte-order mark.
fn trim_field(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Write records back out as CSV with `headers` as the first row.
///
/// Columns a record lacks are written empty; keys outside `headers` are not
/// written.
pub fn records_to_csv(headers: &[String], records: &[Record]) -> AppResult<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for record in records {
        writer.write_record(headers.iter().map(|h| record.get_or_empty(h)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Parse(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Parse(e.to_string()))
}

/// Header list of the first record, or an empty list.
pub fn headers_of(records: &[Record]) -> Vec<String> {
    records
        .first()
        .map(|record| record.keys().map(str::to_string).collect())
        .unwrap_or_default()
}
