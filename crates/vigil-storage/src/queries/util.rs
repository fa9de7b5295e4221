//! Shared conversions between rows and domain values.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::ErrorCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use vigil_core::errors::StoreError;

/// Map a SQLite error, classifying lock contention as transient.
pub fn sql_err(e: rusqlite::Error) -> StoreError {
    match e.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => StoreError::Unavailable {
            message: e.to_string(),
        },
        _ => StoreError::SqliteError {
            message: e.to_string(),
        },
    }
}

/// Fixed-width RFC 3339, so lexical order equals time order.
pub fn ts(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn parse_ts(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Serialization {
            message: format!("bad timestamp {raw:?}: {e}"),
        })
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string(value)?)
}

pub fn from_json<T: DeserializeOwned>(raw: &str) -> Result<T, StoreError> {
    Ok(serde_json::from_str(raw)?)
}

/// Parse a stored enum column.
pub fn parse_enum<T>(column: &str, raw: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T, StoreError> {
    parse(raw).ok_or_else(|| StoreError::Serialization {
        message: format!("unknown {column} value {raw:?}"),
    })
}

/// Collect mapped rows, converting both row and decode failures.
pub fn collect_rows<T, R>(
    rows: impl Iterator<Item = rusqlite::Result<R>>,
    decode: impl Fn(R) -> Result<T, StoreError>,
) -> Result<Vec<T>, StoreError> {
    let mut out = Vec::new();
    for row in rows {
        out.push(decode(row.map_err(sql_err)?)?);
    }
    Ok(out)
}
