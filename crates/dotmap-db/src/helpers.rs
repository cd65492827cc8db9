//! Row-to-entity parsing helpers.
//!
//! Rows are column-indexed; these helpers convert TEXT and INTEGER columns
//! into the typed values used by `dotmap-core` entities. Timestamps may come
//! back in RFC 3339 (written by us) or `SQLite`'s `datetime('now')` format.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use dotmap_core::errors::CoreError;

use crate::error::DatabaseError;

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

/// Parse a stored tag into its dotmap-core enum.
///
/// # Errors
///
/// Returns `DatabaseError::Core` if the string does not match any variant.
pub fn parse_enum<T>(s: &str) -> Result<T, DatabaseError>
where
    T: FromStr<Err = CoreError>,
{
    Ok(s.parse()?)
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read a `COUNT(*)` column.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails or the value is negative.
pub fn get_count(row: &libsql::Row, idx: i32) -> Result<usize, DatabaseError> {
    let n = row.get::<i64>(idx)?;
    usize::try_from(n).map_err(|e| DatabaseError::Query(format!("Invalid count {n}: {e}")))
}

/// Read a 0/1 INTEGER column.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_flag(row: &libsql::Row, idx: i32) -> Result<bool, DatabaseError> {
    Ok(row.get::<i64>(idx)? != 0)
}

/// Read a TEXT column holding a path.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_path(row: &libsql::Row, idx: i32) -> Result<PathBuf, DatabaseError> {
    Ok(PathBuf::from(row.get::<String>(idx)?))
}

/// Render a path for a TEXT column.
#[must_use]
pub fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
