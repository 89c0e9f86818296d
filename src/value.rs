//! # Scalar Values
//!
//! Database scalar values as they appear in a fetched row, plus the column
//! types used to convert raw driver values into richer Rust values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single column value from a result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Uuid(Uuid),
    Json(serde_json::Value),
}

/// One raw result row: column name to value, in select-list order
pub type Row = IndexMap<String, SqlValue>;

/// Field name to value for a single alias within a row
pub type FieldMap = IndexMap<String, SqlValue>;

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert into a JSON value; timestamps and dates use their ISO-8601 form
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SqlValue::Null => serde_json::Value::Null,
            SqlValue::Bool(v) => serde_json::Value::Bool(*v),
            SqlValue::Int(v) => serde_json::Value::from(*v),
            SqlValue::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            SqlValue::Text(v) => serde_json::Value::String(v.clone()),
            SqlValue::Timestamp(v) => {
                serde_json::Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            SqlValue::Date(v) => serde_json::Value::String(v.format("%Y-%m-%d").to_string()),
            SqlValue::Uuid(v) => serde_json::Value::String(v.to_string()),
            SqlValue::Json(v) => v.clone(),
        }
    }

    /// Convert a raw value according to a declared column type.
    ///
    /// Values that cannot be converted are returned unchanged.
    pub fn convert(self, column_type: ColumnType) -> SqlValue {
        match (column_type, self) {
            (_, SqlValue::Null) => SqlValue::Null,
            (ColumnType::Integer, SqlValue::Text(s)) => match s.trim().parse::<i64>() {
                Ok(v) => SqlValue::Int(v),
                Err(_) => SqlValue::Text(s),
            },
            (ColumnType::Integer, SqlValue::Float(f)) if f.fract() == 0.0 => {
                SqlValue::Int(f as i64)
            }
            (ColumnType::Integer, SqlValue::Bool(b)) => SqlValue::Int(i64::from(b)),
            (ColumnType::Float, SqlValue::Int(i)) => SqlValue::Float(i as f64),
            (ColumnType::Float, SqlValue::Text(s)) => match s.trim().parse::<f64>() {
                Ok(v) => SqlValue::Float(v),
                Err(_) => SqlValue::Text(s),
            },
            (ColumnType::Boolean, SqlValue::Int(i)) => SqlValue::Bool(i != 0),
            (ColumnType::Boolean, SqlValue::Text(s)) => {
                match s.trim().to_ascii_lowercase().as_str() {
                    "1" | "t" | "true" | "yes" | "on" => SqlValue::Bool(true),
                    "0" | "f" | "false" | "no" | "off" => SqlValue::Bool(false),
                    _ => SqlValue::Text(s),
                }
            }
            (ColumnType::String, SqlValue::Int(i)) => SqlValue::Text(i.to_string()),
            (ColumnType::String, SqlValue::Float(f)) => SqlValue::Text(f.to_string()),
            (ColumnType::DateTime, SqlValue::Text(s)) => match parse_timestamp(&s) {
                Some(ts) => SqlValue::Timestamp(ts),
                None => SqlValue::Text(s),
            },
            (ColumnType::Date, SqlValue::Text(s)) => {
                match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
                    Ok(d) => SqlValue::Date(d),
                    Err(_) => SqlValue::Text(s),
                }
            }
            (ColumnType::Date, SqlValue::Timestamp(ts)) => SqlValue::Date(ts.date()),
            (ColumnType::Uuid, SqlValue::Text(s)) => match Uuid::parse_str(s.trim()) {
                Ok(u) => SqlValue::Uuid(u),
                Err(_) => SqlValue::Text(s),
            },
            (ColumnType::Json, SqlValue::Text(s)) => match serde_json::from_str(&s) {
                Ok(v) => SqlValue::Json(v),
                Err(_) => SqlValue::Text(s),
            },
            (_, value) => value,
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc).naive_utc());
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(v) => write!(f, "{v}"),
            SqlValue::Int(v) => write!(f, "{v}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Text(v) => write!(f, "{v}"),
            SqlValue::Timestamp(v) => write!(f, "{v}"),
            SqlValue::Date(v) => write!(f, "{v}"),
            SqlValue::Uuid(v) => write!(f, "{v}"),
            SqlValue::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(i64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

impl From<serde_json::Value> for SqlValue {
    /// Scalars map onto the matching variant; arrays and objects stay JSON
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => SqlValue::Null,
            serde_json::Value::Bool(b) => SqlValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Int(i),
                None => n.as_f64().map(SqlValue::Float).unwrap_or(SqlValue::Null),
            },
            serde_json::Value::String(s) => SqlValue::Text(s),
            other => SqlValue::Json(other),
        }
    }
}

/// Declared type of a table column, used to convert raw driver values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    String,
    DateTime,
    Date,
    Uuid,
    Json,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::String => "string",
            ColumnType::DateTime => "datetime",
            ColumnType::Date => "date",
            ColumnType::Uuid => "uuid",
            ColumnType::Json => "json",
        }
    }
}

/// Build a [`Row`] from `(column, value)` pairs, keeping their order
pub fn row<I, K, V>(columns: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<SqlValue>,
{
    columns
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
