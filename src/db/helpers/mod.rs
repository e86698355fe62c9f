use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

/// `datetime-local` form layout, e.g. `2021-06-16T12:00`.
pub const FORM_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parses a form datetime; the value carries no offset and is read as UTC.
pub fn parse_form_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), FORM_DATETIME_FORMAT)
        .map(|naive| naive.and_utc())
        .with_context(|| format!("{field} must look like 2021-06-16T12:00, got '{value}'"))
}

/// Reads an RFC 3339 column and parses it in one step.
pub fn get_datetime(row: &Row, column: &str) -> Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    parse_datetime(&raw, column)
}

/// Trimmed text, or `None` when the input is blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
