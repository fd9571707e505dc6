//! Row-to-document parsing helpers.
//!
//! Timestamps may come back in two formats: RFC 3339 written by this crate,
//! or `SQLite`'s `datetime('now')` default. Both are accepted.

use chrono::{DateTime, Utc};
use eagle_core::document::Document;
use serde_json::{Map, Value};

use crate::error::DatabaseError;

/// Columns read by [`row_to_document`], in order.
pub const DOCUMENT_COLS: &str = "id, body, created_at, updated_at";

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a stored body. Bodies are always JSON objects.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the column holds anything else.
pub fn parse_body(s: &str) -> Result<Map<String, Value>, DatabaseError> {
    match serde_json::from_str(s) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DatabaseError::Query(format!(
            "document body is not an object: {other}"
        ))),
        Err(e) => Err(DatabaseError::Query(format!("Invalid JSON in body: {e}"))),
    }
}

/// Convert a row selected with [`DOCUMENT_COLS`].
///
/// # Errors
///
/// Returns `DatabaseError` if a column is missing or malformed.
pub fn row_to_document(row: &libsql::Row) -> Result<Document, DatabaseError> {
    Ok(Document {
        id: Some(row.get::<String>(0)?),
        body: parse_body(&row.get::<String>(1)?)?,
        created_at: Some(parse_datetime(&row.get::<String>(2)?)?),
        updated_at: Some(parse_datetime(&row.get::<String>(3)?)?),
    })
}

/// Check that a location name is safe to splice into an SQL identifier.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidIdentifier` for anything but ASCII
/// letters, digits and `_`.
pub fn validate_identifier(name: &str) -> Result<(), DatabaseError> {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(DatabaseError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_datetime_formats() {
        assert!(parse_datetime("2026-02-09T14:30:00+00:00").is_ok());
        assert!(parse_datetime("2026-02-09 14:30:00").is_ok());
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn body_must_be_object() {
        assert!(parse_body(r#"{"a":1}"#).is_ok());
        assert!(parse_body("[1]").is_err());
        assert!(parse_body("{").is_err());
    }

    #[test]
    fn identifiers() {
        assert!(validate_identifier("epic").is_ok());
        assert!(validate_identifier("audit_log2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("epic'; --").is_err());
    }
}
