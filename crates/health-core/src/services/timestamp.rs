//! Export timestamp parsing
//!
//! The exporter writes `YYYY-MM-DD HH:MM:SS +ZZZZ`. Values are stored
//! normalized to UTC with millisecond precision.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Error, Result};

pub const EXPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Parse an export timestamp. The text must match the export format
/// exactly: zero-padded fields and a `+hhmm` offset.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let parsed =
        DateTime::parse_from_str(value, EXPORT_FORMAT).map_err(|_| Error::timestamp(value))?;
    // chrono accepts unpadded fields and `+hh:mm`; re-render to reject them
    if parsed.format(EXPORT_FORMAT).to_string() != value {
        return Err(Error::timestamp(value));
    }
    Ok(parsed.with_timezone(&Utc))
}

/// Parse and render in storage form
pub fn storage_timestamp(value: &str) -> Result<String> {
    parse_timestamp(value).map(|dt| dt.format(STORAGE_FORMAT).to_string())
}

/// Calendar date from the first 10 characters of `value`
pub fn storage_date(value: &str) -> Result<String> {
    let day = value.get(..10).ok_or_else(|| Error::Date {
        value: value.to_string(),
    })?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| Error::Date {
            value: value.to_string(),
        })
}
