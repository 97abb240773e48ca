//! Tagged scalar values for query results.
//!
//! The masker dispatches on these variants instead of downcasting dynamic
//! types at the mask site. `render` is the canonical string form used by
//! the hash and partial masks, so equal renderings of different underlying
//! types mask identically (integer 12345 and the string "12345" hash to the
//! same digest).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, Serializer};

/// One decoded result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Bytes(Vec<u8>),
    /// JSON/JSONB columns and anything else with a structured decoding.
    Json(serde_json::Value),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Canonical string rendering, used by the hash and partial masks.
    pub fn render(&self) -> String {
        match self {
            SqlValue::Null => String::new(),
            SqlValue::Bool(b) => b.to_string(),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Text(s) => s.clone(),
            SqlValue::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            SqlValue::Bytes(b) => format!("\\x{}", hex::encode(b)),
            SqlValue::Json(v) => v.to_string(),
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SqlValue::Null => serializer.serialize_none(),
            SqlValue::Bool(b) => serializer.serialize_bool(*b),
            SqlValue::Int(n) => serializer.serialize_i64(*n),
            SqlValue::Float(f) => serializer.serialize_f64(*f),
            SqlValue::Text(s) => serializer.serialize_str(s),
            SqlValue::Timestamp(ts) => {
                serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            SqlValue::Bytes(b) => serializer.serialize_str(&format!("\\x{}", hex::encode(b))),
            SqlValue::Json(v) => v.serialize(serializer),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Int(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_is_type_blind_for_equal_digits() {
        assert_eq!(SqlValue::Int(12345).render(), SqlValue::Text("12345".into()).render());
    }

    #[test]
    fn render_of_null_is_empty() {
        assert_eq!(SqlValue::Null.render(), "");
    }

    #[test]
    fn serializes_to_plain_json_scalars() {
        let v = serde_json::to_value(SqlValue::Int(7)).unwrap();
        assert_eq!(v, serde_json::json!(7));
        let v = serde_json::to_value(SqlValue::Null).unwrap();
        assert!(v.is_null());
        let v = serde_json::to_value(SqlValue::Text("hi".into())).unwrap();
        assert_eq!(v, serde_json::json!("hi"));
    }
}
