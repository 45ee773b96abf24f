//! # Issue Dates
//!
//! The registry stores issue dates as free strings. In practice they are
//! `YYYY-MM-DD`, but records written by older tooling carry a full
//! timestamp (`2025-01-15T09:30:00` or RFC 3339 with an offset). Only the
//! calendar day is significant; the time component is discarded.
//!
//! Two presentation forms are used downstream:
//! - [`format_numeric`]: `M/D/YYYY`, the export column format.
//! - [`format_display`]: `Mon D, YYYY`, the listing format.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::error::DateError;

/// Parse a registry issue date.
///
/// # Errors
///
/// Returns [`DateError`] if the input is neither a calendar date nor a
/// timestamp.
pub fn parse_issue_date(raw: &str) -> Result<NaiveDate, DateError> {
    let s = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    Err(DateError {
        raw: raw.to_string(),
    })
}

/// Numeric `M/D/YYYY` form, without zero padding.
pub fn format_numeric(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// Short display form, e.g. `Jan 5, 2025`.
pub fn format_display(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `YYYY-MM-DD` stamp used in export file names.
pub fn export_stamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
