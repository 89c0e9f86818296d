//! Decoding of PostgreSQL rows into [`Row`] values, driven by the column's
//! reported type name.
//!
//! Types without a richer [`SqlValue`] counterpart (`NUMERIC`, `TIME`,
//! `INTERVAL`) are kept exactly as text. Other types whose wire value is
//! readable text, such as enums and `citext`, fall back to [`SqlValue::Text`].

use crate::error::{MapperError, Result};
use crate::value::{Row, SqlValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::types::PgInterval;
use sqlx::postgres::{PgRow, PgValueRef};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use tracing::debug;
use uuid::Uuid;

pub fn pg_row_to_row(pg_row: &PgRow) -> Result<Row> {
    let mut row = Row::with_capacity(pg_row.len());
    for (index, column) in pg_row.columns().iter().enumerate() {
        let raw = pg_row.try_get_raw(index)?;
        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            decode(pg_row, index, column.type_info().name(), raw)?
        };
        row.insert(column.name().to_string(), value);
    }
    Ok(row)
}

fn decode(pg_row: &PgRow, index: usize, type_name: &str, raw: PgValueRef<'_>) -> Result<SqlValue> {
    let value = match type_name {
        "INT2" => SqlValue::Int(i64::from(pg_row.try_get::<i16, _>(index)?)),
        "INT4" => SqlValue::Int(i64::from(pg_row.try_get::<i32, _>(index)?)),
        "INT8" => SqlValue::Int(pg_row.try_get::<i64, _>(index)?),
        "\"CHAR\"" => SqlValue::Int(i64::from(pg_row.try_get::<i8, _>(index)?)),
        "FLOAT4" => SqlValue::Float(f64::from(pg_row.try_get::<f32, _>(index)?)),
        "FLOAT8" => SqlValue::Float(pg_row.try_get::<f64, _>(index)?),
        "NUMERIC" => SqlValue::Text(pg_row.try_get::<Decimal, _>(index)?.to_string()),
        "BOOL" => SqlValue::Bool(pg_row.try_get::<bool, _>(index)?),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
            SqlValue::Text(pg_row.try_get::<String, _>(index)?)
        }
        "TIMESTAMP" => SqlValue::Timestamp(pg_row.try_get::<NaiveDateTime, _>(index)?),
        "TIMESTAMPTZ" => {
            SqlValue::Timestamp(pg_row.try_get::<DateTime<Utc>, _>(index)?.naive_utc())
        }
        "DATE" => SqlValue::Date(pg_row.try_get::<NaiveDate, _>(index)?),
        "TIME" => SqlValue::Text(pg_row.try_get::<NaiveTime, _>(index)?.to_string()),
        "INTERVAL" => SqlValue::Text(format_interval(&pg_row.try_get::<PgInterval, _>(index)?)),
        "UUID" => SqlValue::Uuid(pg_row.try_get::<Uuid, _>(index)?),
        "JSON" | "JSONB" => SqlValue::Json(pg_row.try_get::<serde_json::Value, _>(index)?),
        other => match readable_text(raw) {
            Some(text) => {
                debug!(column = index, type_name = %other, "Decoded column as text");
                SqlValue::Text(text)
            }
            None => {
                return Err(MapperError::Database(format!(
                    "Unsupported column type '{other}' at position {index}"
                )))
            }
        },
    };
    Ok(value)
}

/// The raw value when it is printable UTF-8
fn readable_text(raw: PgValueRef<'_>) -> Option<String> {
    let text = raw.as_str().ok()?;
    let printable = text.chars().all(|c| !c.is_control() || c.is_whitespace());
    printable.then(|| text.to_string())
}

/// ISO 8601 duration (`P1M2DT3.5S`)
fn format_interval(interval: &PgInterval) -> String {
    let seconds = interval.microseconds as f64 / 1_000_000.0;
    format!("P{}M{}DT{}S", interval.months, interval.days, seconds)
}
