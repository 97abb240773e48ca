//! Decoding driver rows into the domain row model.
//!
//! The connection's field descriptions determine result column names, not
//! the original SQL. Decoding dispatches on the reported column type name;
//! anything without a structured mapping degrades to its text rendering
//! rather than failing the whole result set.

use anyhow::anyhow;
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use strait_core::{QueryError, ResultRow, SqlValue};

/// Materialises one driver row into an ordered [`ResultRow`].
pub fn decode_row(row: &PgRow) -> Result<ResultRow, QueryError> {
    let mut out = ResultRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = decode_value(row, index, column.type_info().name())
            .map_err(|e| QueryError::Internal(anyhow!("decoding column {:?}: {e}", column.name())))?;
        out.push(column.name().to_string(), value);
    }
    Ok(out)
}

fn decode_value(row: &PgRow, index: usize, type_name: &str) -> Result<SqlValue, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(SqlValue::Null);
    }

    let value = match type_name {
        "BOOL" => SqlValue::Bool(row.try_get::<bool, _>(index)?),
        "INT2" => SqlValue::Int(row.try_get::<i16, _>(index)? as i64),
        "INT4" => SqlValue::Int(row.try_get::<i32, _>(index)? as i64),
        "INT8" => SqlValue::Int(row.try_get::<i64, _>(index)?),
        "FLOAT4" => SqlValue::Float(row.try_get::<f32, _>(index)? as f64),
        "FLOAT8" => SqlValue::Float(row.try_get::<f64, _>(index)?),
        "NUMERIC" => {
            let n = row.try_get::<BigDecimal, _>(index)?;
            match n.to_f64() {
                Some(f) => SqlValue::Float(f),
                None => SqlValue::Text(n.to_string()),
            }
        }
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" | "CITEXT" => {
            SqlValue::Text(row.try_get::<String, _>(index)?)
        }
        "UUID" => SqlValue::Text(row.try_get::<uuid::Uuid, _>(index)?.to_string()),
        "TIMESTAMPTZ" => SqlValue::Timestamp(row.try_get::<DateTime<Utc>, _>(index)?),
        "TIMESTAMP" => {
            SqlValue::Timestamp(row.try_get::<NaiveDateTime, _>(index)?.and_utc())
        }
        "DATE" => SqlValue::Text(
            row.try_get::<NaiveDate, _>(index)?
                .format("%Y-%m-%d")
                .to_string(),
        ),
        "TIME" => SqlValue::Text(
            row.try_get::<NaiveTime, _>(index)?
                .format("%H:%M:%S")
                .to_string(),
        ),
        "JSON" | "JSONB" => SqlValue::Json(row.try_get::<serde_json::Value, _>(index)?),
        "BYTEA" => SqlValue::Bytes(row.try_get::<Vec<u8>, _>(index)?),
        // Enums, intervals, arrays, domains: fall back to the text form
        // when the driver can give one, null otherwise.
        _ => match row.try_get::<String, _>(index) {
            Ok(s) => SqlValue::Text(s),
            Err(_) => SqlValue::Null,
        },
    };
    Ok(value)
}
