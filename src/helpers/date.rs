//! Date helper functions

use chrono::NaiveDate;

/// Parse the calendar date at the start of an ISO-8601 string.
///
/// Only used for display; ordering always compares the raw strings.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Format a date in long form (like "January 5, 2024")
pub fn long_date(date: &NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Long-form display of an ISO date string, or the raw string when it
/// does not parse
pub fn display_date(s: &str) -> String {
    parse_iso_date(s)
        .map(|date| long_date(&date))
        .unwrap_or_else(|| s.to_string())
}
