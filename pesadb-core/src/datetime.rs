#[cfg(not(feature = "std"))]
use alloc::{borrow::ToOwned, format, string::String};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::value::ValueError;

/// Parses an ISO-8601 calendar date (`YYYY-MM-DD`).
pub fn parse_date(value: &str) -> Result<NaiveDate, ValueError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ValueError::new(format!(
            "Invalid date format: {}. Expected format: YYYY-MM-DD (e.g., '2024-01-15')",
            value
        ))
    })
}

/// Parses a time of day: `HH:MM:SS.fff`, `HH:MM:SS` or `HH:MM`.
pub fn parse_time(value: &str) -> Result<NaiveTime, ValueError> {
    for format in ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"] {
        if let Ok(time) = NaiveTime::parse_from_str(value, format) {
            return Ok(time);
        }
    }
    Err(ValueError::new(format!(
        "Invalid time format: {}. Expected format: HH:MM:SS or HH:MM (e.g., '14:30:00' or '14:30')",
        value
    )))
}

/// Parses an ISO-8601 datetime.
///
/// Accepts a `T` or space separator, optional fractional seconds, an
/// optional timezone offset (`Z` or `+HH:MM`), and a bare date. Values
/// carrying an offset are normalized to UTC and stored without it.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, ValueError> {
    let normalized: String = if value.ends_with('Z') || value.ends_with('z') {
        let mut s = value[..value.len() - 1].to_owned();
        s.push_str("+00:00");
        s
    } else {
        value.to_owned()
    };

    for format in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(datetime) = DateTime::parse_from_str(&normalized, format) {
            return Ok(datetime.naive_utc());
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(datetime);
        }
    }
    // A bare date is a valid datetime at midnight.
    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).expect("midnight is a valid time"));
    }

    Err(ValueError::new(format!(
        "Invalid datetime format: {}. Expected ISO-8601 format (e.g., '2024-01-15T10:30:00' or '2024-01-15 10:30:00')",
        value
    )))
}
