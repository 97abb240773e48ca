//! Result types for schema exploration.

use crate::cardinality::CardinalityClass;
use crate::row::ResultRow;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SchemaInfo {
    pub name: String,
}

/// One table in a listing or discovery result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableInfo {
    pub schema: String,
    pub name: String,
    /// `table` or `view`.
    pub r#type: String,
    pub row_estimate: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_bytes: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub size_human: String,
    pub column_count: i32,
    pub has_indexes: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

/// Profiling data for one column, from catalog statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    pub null_fraction: f64,
    pub cardinality: CardinalityClass,
    pub distinct_count: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub most_common_vals: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub most_common_freqs: Vec<f64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub min_value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub max_value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub default_value: String,
    pub is_primary_key: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ColumnStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForeignKey {
    pub constraint_name: String,
    pub column_name: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckConstraint {
    pub name: String,
    pub expression: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexInfo {
    pub name: String,
    pub definition: String,
    pub is_unique: bool,
}

/// Usage statistics for one index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexUsage {
    pub name: String,
    pub scans: i64,
    pub size_bytes: i64,
    pub size_human: String,
}

/// A foreign key suggested by naming and type compatibility but not
/// declared in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct InferredFk {
    pub column_name: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub confidence: String,
    pub reason: String,
}

/// Full description of one table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableDetail {
    pub schema: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    pub row_estimate: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_bytes: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub size_human: String,
    pub columns: Vec<ColumnInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<IndexInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub check_constraints: Vec<CheckConstraint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats_age: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stats_age_warning: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sample_rows: Vec<ResultRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub index_usage: Vec<IndexUsage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inferred_fks: Vec<InferredFk>,
}

/// Tables grouped under their schema.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaOverview {
    pub name: String,
    pub tables: Vec<TableInfo>,
}

/// The `discover` response: all schemas with nested tables.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryResult {
    pub schemas: Vec<SchemaOverview>,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}
