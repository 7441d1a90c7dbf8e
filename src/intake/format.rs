//! Calendar parsing and spoken-friendly formatting.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::IntakeError;

/// Accepted date-of-birth format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Accepted appointment timestamp format.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Human-readable forms of the accepted formats, used in rejection messages.
pub const DATE_FORMAT_HINT: &str = "YYYY-MM-DD";
pub const DATETIME_FORMAT_HINT: &str = "YYYY-MM-DD HH:MM";

/// Parse a calendar date such as `1990-04-17`.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, IntakeError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| IntakeError::Validation {
        field,
        value: value.to_string(),
        expected: DATE_FORMAT_HINT,
    })
}

/// Parse an appointment timestamp such as `2023-05-01 10:00`.
pub fn parse_datetime(field: &'static str, value: &str) -> Result<NaiveDateTime, IntakeError> {
    NaiveDateTime::parse_from_str(value.trim(), DATETIME_FORMAT).map_err(|_| {
        IntakeError::Validation {
            field,
            value: value.to_string(),
            expected: DATETIME_FORMAT_HINT,
        }
    })
}

/// "Monday, May 1, 2023 at 10:00 AM"
pub fn spoken_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%A, %B %-d, %Y at %-I:%M %p").to_string()
}

/// "May 1, 2023"
pub fn spoken_date(d: &NaiveDate) -> String {
    d.format("%B %-d, %Y").to_string()
}
