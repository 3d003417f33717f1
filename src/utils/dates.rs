//! Entry date parsing and formatting
//!
//! The Date column is free text typed into the sheet. These helpers accept
//! the handful of shapes people actually type there.

use chrono::NaiveDate;

const DATE_FORMATS: &[&str] = &[
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
];

/// Parse an entry date, `None` when no known format matches
pub fn parse_entry_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Label used for new entries, e.g. `19 October 2026`
pub fn format_entry_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_long_month_label() {
        assert_eq!(parse_entry_date("19 October 2026"), Some(ymd(2026, 10, 19)));
        assert_eq!(parse_entry_date(" 3 May 2026 "), Some(ymd(2026, 5, 3)));
    }

    #[test]
    fn test_other_shapes() {
        assert_eq!(parse_entry_date("19 Oct 2026"), Some(ymd(2026, 10, 19)));
        assert_eq!(parse_entry_date("October 19, 2026"), Some(ymd(2026, 10, 19)));
        assert_eq!(parse_entry_date("2026-10-19"), Some(ymd(2026, 10, 19)));
        assert_eq!(parse_entry_date("10/19/2026"), Some(ymd(2026, 10, 19)));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_entry_date(""), None);
        assert_eq!(parse_entry_date("yesterday"), None);
    }

    #[test]
    fn test_format_has_no_padding() {
        assert_eq!(format_entry_date(ymd(2026, 5, 3)), "3 May 2026");
        assert_eq!(format_entry_date(ymd(2026, 10, 19)), "19 October 2026");
    }
}
