//! Lenient timestamp parsing for point-of-sale exports.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Naive formats tried after RFC 3339.
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp cell.
///
/// Accepts RFC 3339 (converted to UTC), `YYYY-MM-DD HH:MM:SS` with optional
/// fractional seconds, and bare `YYYY-MM-DD` dates, which map to midnight.
/// Returns `None` for anything else.
///
/// # Examples
/// ```
/// use sidekick_data::parse_timestamp;
///
/// assert!(parse_timestamp("2024-03-01 12:30:00").is_some());
/// assert!(parse_timestamp("2024-03-01T12:30:00+02:00").is_some());
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
