//! Field value types for documents.
//!
//! # Examples
//!
//! ```
//! use sarissa_jpc::document::FieldValue;
//! use sarissa_jpc::schema::FieldType;
//! use serde_json::json;
//!
//! let year = FieldValue::from_json(FieldType::I64, &json!(1952)).unwrap();
//! assert_eq!(year, FieldValue::I64(1952));
//! assert_eq!(year.index_term(), "1952");
//!
//! let when = FieldValue::from_json(FieldType::Date, &json!("1952-09-01T00:00:00Z")).unwrap();
//! assert_eq!(when.index_term(), "1952-09-01T00:00:00Z");
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{JpcError, Result};
use crate::schema::FieldType;

/// A single value of a document field.
///
/// Serializes to the natural JSON value; dates become RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text value
    Text(String),
    /// Signed integer value
    I64(i64),
    /// Unsigned integer value
    U64(u64),
    /// Floating point value
    F64(f64),
    /// DateTime value
    Date(DateTime<Utc>),
}

impl FieldValue {
    /// Convert a JSON value to a field value of the given type.
    pub fn from_json(field_type: FieldType, value: &Value) -> Result<Self> {
        let mismatch = || {
            JpcError::document(format!(
                "value {value} is not a valid {}",
                field_type.as_str()
            ))
        };

        match field_type {
            FieldType::Text => match value {
                Value::String(s) => Ok(FieldValue::Text(s.clone())),
                Value::Number(n) => Ok(FieldValue::Text(n.to_string())),
                Value::Bool(b) => Ok(FieldValue::Text(b.to_string())),
                _ => Err(mismatch()),
            },
            FieldType::I64 => value.as_i64().map(FieldValue::I64).ok_or_else(mismatch),
            FieldType::U64 => value.as_u64().map(FieldValue::U64).ok_or_else(mismatch),
            FieldType::F64 => value
                .as_f64()
                .filter(|f| f.is_finite())
                .map(FieldValue::F64)
                .ok_or_else(mismatch),
            FieldType::Date => match value {
                Value::String(s) => parse_date(s).map(FieldValue::Date),
                Value::Number(n) => n
                    .as_i64()
                    .and_then(|secs| DateTime::from_timestamp(secs, 0))
                    .map(FieldValue::Date)
                    .ok_or_else(mismatch),
                _ => Err(mismatch()),
            },
        }
    }

    /// Parse a query term typed by the user into a value of the given type.
    pub fn from_text(field_type: FieldType, text: &str) -> Result<Self> {
        let invalid = |e: String| {
            JpcError::query(format!(
                "{text} is not a valid {} term: {e}",
                field_type.as_str()
            ))
        };

        match field_type {
            FieldType::Text => Ok(FieldValue::Text(text.to_string())),
            FieldType::I64 => text
                .parse()
                .map(FieldValue::I64)
                .map_err(|e| invalid(e.to_string())),
            FieldType::U64 => text
                .parse()
                .map(FieldValue::U64)
                .map_err(|e| invalid(e.to_string())),
            FieldType::F64 => text
                .parse()
                .map(FieldValue::F64)
                .map_err(|e| invalid(e.to_string())),
            FieldType::Date => parse_date(text)
                .map(FieldValue::Date)
                .map_err(|e| invalid(e.to_string())),
        }
    }

    /// The type of this value.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::I64(_) => FieldType::I64,
            FieldValue::U64(_) => FieldType::U64,
            FieldValue::F64(_) => FieldType::F64,
            FieldValue::Date(_) => FieldType::Date,
        }
    }

    /// Convert to text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The canonical string a value is indexed and queried under.
    pub fn index_term(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::I64(i) => i.to_string(),
            FieldValue::U64(u) => u.to_string(),
            FieldValue::F64(f) => f.to_string(),
            FieldValue::Date(d) => d.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Parse an RFC 3339 timestamp or a string of epoch seconds.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    s.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| JpcError::document(format!("invalid date {s}")))
}
