//! Individual catalog fetches backing the explorer.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{Postgres, Row};
use std::collections::{HashMap, HashSet};
use strait_core::port::{
    CheckConstraint, ColumnInfo, ColumnStats, ForeignKey, IndexInfo, IndexUsage, InferredFk,
    SchemaInfo, TableDetail, TableInfo,
};
use strait_core::{match_fk_naming_pattern, CardinalityClass, QueryError, ResultRow};

use crate::error::classify;
use crate::explorer::PgExplorer;
use crate::filters::{is_type_compatible, quote_ident, schema_filter};
use crate::queries;
use crate::rows::decode_row;

fn bind_all<'q>(sql: &'q str, args: &'q [String]) -> Query<'q, Postgres, PgArguments> {
    let mut query = sqlx::query(sql);
    for arg in args {
        query = query.bind(arg);
    }
    query
}

impl PgExplorer {
    pub(crate) async fn fetch_schemas(&self) -> Result<Vec<SchemaInfo>, QueryError> {
        let (filter, args) = schema_filter(&self.schemas, "s.schema_name", 1);
        let sql = queries::LIST_SCHEMAS.replace("{filter}", &filter);

        let rows = bind_all(&sql, &args)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        rows.iter()
            .map(|row| {
                Ok(SchemaInfo {
                    name: row.try_get(0).map_err(classify)?,
                })
            })
            .collect()
    }

    pub(crate) async fn fetch_tables(&self) -> Result<Vec<TableInfo>, QueryError> {
        let (filter, args) = schema_filter(&self.schemas, "t.table_schema", 1);
        let sql = queries::LIST_TABLES.replace("{filter}", &filter);

        let rows = bind_all(&sql, &args)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        rows.iter()
            .map(|row| {
                Ok(TableInfo {
                    schema: row.try_get(0).map_err(classify)?,
                    name: row.try_get(1).map_err(classify)?,
                    r#type: row.try_get(2).map_err(classify)?,
                    row_estimate: row.try_get(3).map_err(classify)?,
                    total_bytes: row.try_get(4).map_err(classify)?,
                    size_human: row.try_get(5).map_err(classify)?,
                    column_count: row.try_get(6).map_err(classify)?,
                    has_indexes: row.try_get(7).map_err(classify)?,
                    comment: row.try_get(8).map_err(classify)?,
                })
            })
            .collect()
    }

    /// Resolves schema and comment for a table named without a schema.
    pub(crate) async fn fetch_table_meta(
        &self,
        table: &str,
    ) -> Result<(String, String), QueryError> {
        let (filter, args) = schema_filter(&self.schemas, "t.table_schema", 2);
        let sql = queries::TABLE_META.replace("{filter}", &filter);

        let mut query = sqlx::query(&sql).bind(table);
        for arg in &args {
            query = query.bind(arg);
        }

        match query.fetch_optional(&self.pool).await.map_err(classify)? {
            Some(row) => Ok((
                row.try_get(0).map_err(classify)?,
                row.try_get(1).map_err(classify)?,
            )),
            None => Err(QueryError::NotFound(table.to_string())),
        }
    }

    pub(crate) async fn fetch_table_comment(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<String, QueryError> {
        match sqlx::query(queries::TABLE_COMMENT)
            .bind(schema)
            .bind(table)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?
        {
            Some(row) => row.try_get(0).map_err(classify),
            None => Err(QueryError::NotFound(table.to_string())),
        }
    }

    pub(crate) async fn fetch_table_size(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<(i64, i64, String), QueryError> {
        let row = sqlx::query(queries::TABLE_SIZE)
            .bind(schema)
            .bind(table)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;
        Ok((
            row.try_get(0).map_err(classify)?,
            row.try_get(1).map_err(classify)?,
            row.try_get(2).map_err(classify)?,
        ))
    }

    pub(crate) async fn fetch_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnInfo>, QueryError> {
        let rows = sqlx::query(queries::COLUMNS)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        rows.iter()
            .map(|row| {
                Ok(ColumnInfo {
                    name: row.try_get(0).map_err(classify)?,
                    data_type: row.try_get(1).map_err(classify)?,
                    is_nullable: row.try_get(2).map_err(classify)?,
                    default_value: row.try_get(3).map_err(classify)?,
                    is_primary_key: false,
                    comment: row.try_get(4).map_err(classify)?,
                    stats: None,
                })
            })
            .collect()
    }

    pub(crate) async fn mark_primary_keys(
        &self,
        detail: &mut TableDetail,
    ) -> Result<(), QueryError> {
        let rows = sqlx::query(queries::PRIMARY_KEYS)
            .bind(&detail.schema)
            .bind(&detail.name)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        let mut pk_columns = HashSet::new();
        for row in &rows {
            pk_columns.insert(row.try_get::<String, _>(0).map_err(classify)?);
        }

        for column in &mut detail.columns {
            if pk_columns.contains(&column.name) {
                column.is_primary_key = true;
            }
        }
        Ok(())
    }

    /// Enriches columns with pg_stats data: cardinality class, null rates,
    /// common values for enum-like columns, and histogram min/max bounds.
    pub(crate) async fn attach_column_stats(
        &self,
        schema: &str,
        table: &str,
        detail: &mut TableDetail,
    ) -> Result<(), QueryError> {
        let rows = sqlx::query(queries::COLUMN_STATS)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        let mut stats_by_column: HashMap<String, ColumnStats> = HashMap::new();
        for row in &rows {
            let attname: String = row.try_get(0).map_err(classify)?;
            let null_frac: f64 = row.try_get(1).map_err(classify)?;
            let n_distinct: f64 = row.try_get(2).map_err(classify)?;
            let mcv_raw: Option<String> = row.try_get(3).map_err(classify)?;
            let mcf_raw: Option<String> = row.try_get(4).map_err(classify)?;
            let histogram_raw: Option<String> = row.try_get(5).map_err(classify)?;

            let distinct_count = pg_distinct_to_absolute(n_distinct, detail.row_estimate);
            let cardinality = CardinalityClass::classify(distinct_count, detail.row_estimate);

            let mut stats = ColumnStats {
                null_fraction: null_frac,
                cardinality,
                distinct_count,
                most_common_vals: Vec::new(),
                most_common_freqs: Vec::new(),
                min_value: String::new(),
                max_value: String::new(),
            };

            // Common values are only interesting when the column behaves
            // like an enum.
            if cardinality == CardinalityClass::EnumLike {
                if let Some(raw) = mcv_raw {
                    stats.most_common_vals = parse_pg_array(&raw);
                }
                if let Some(raw) = mcf_raw {
                    stats.most_common_freqs = parse_pg_float_array(&raw);
                }
            }

            if let Some(raw) = histogram_raw {
                let bounds = parse_pg_array(&raw);
                if bounds.len() >= 2 {
                    stats.min_value = bounds.first().cloned().unwrap_or_default();
                    stats.max_value = bounds.last().cloned().unwrap_or_default();
                }
            }

            stats_by_column.insert(attname, stats);
        }

        for column in &mut detail.columns {
            if let Some(stats) = stats_by_column.remove(&column.name) {
                column.stats = Some(stats);
            }
        }
        Ok(())
    }

    pub(crate) async fn fetch_foreign_keys(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ForeignKey>, QueryError> {
        let rows = sqlx::query(queries::FOREIGN_KEYS)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        rows.iter()
            .map(|row| {
                Ok(ForeignKey {
                    constraint_name: row.try_get(0).map_err(classify)?,
                    column_name: row.try_get(1).map_err(classify)?,
                    referenced_table: row.try_get(2).map_err(classify)?,
                    referenced_column: row.try_get(3).map_err(classify)?,
                })
            })
            .collect()
    }

    pub(crate) async fn fetch_indexes(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<IndexInfo>, QueryError> {
        let rows = sqlx::query(queries::INDEXES)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        rows.iter()
            .map(|row| {
                Ok(IndexInfo {
                    name: row.try_get(0).map_err(classify)?,
                    definition: row.try_get(1).map_err(classify)?,
                    is_unique: row.try_get(2).map_err(classify)?,
                })
            })
            .collect()
    }

    pub(crate) async fn fetch_check_constraints(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<CheckConstraint>, QueryError> {
        let rows = sqlx::query(queries::CHECK_CONSTRAINTS)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        rows.iter()
            .map(|row| {
                Ok(CheckConstraint {
                    name: row.try_get(0).map_err(classify)?,
                    expression: row.try_get(1).map_err(classify)?,
                })
            })
            .collect()
    }

    /// Last ANALYZE timestamp; `None` when there is no record, which is not
    /// an error (a fresh table simply has no stats yet).
    pub(crate) async fn fetch_stats_age(
        &self,
        schema: &str,
        table: &str,
    ) -> Option<DateTime<Utc>> {
        sqlx::query(queries::STATS_AGE)
            .bind(schema)
            .bind(table)
            .fetch_optional(&self.pool)
            .await
            .ok()
            .flatten()
            .and_then(|row| row.try_get::<Option<DateTime<Utc>>, _>(0).ok())
            .flatten()
    }

    /// A handful of representative rows. BERNOULLI sampling works at the
    /// row level, so it returns rows even on small tables; table types that
    /// reject TABLESAMPLE fall back to a plain LIMIT.
    pub(crate) async fn fetch_sample_rows(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ResultRow>, QueryError> {
        let fqn = format!("{}.{}", quote_ident(schema), quote_ident(table));

        let sampled = format!("SELECT * FROM {fqn} TABLESAMPLE BERNOULLI(50) LIMIT 5");
        let rows = match sqlx::query(&sampled).fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(_) => {
                let plain = format!("SELECT * FROM {fqn} LIMIT 5");
                sqlx::query(&plain)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(classify)?
            }
        };

        rows.iter().map(decode_row).collect()
    }

    pub(crate) async fn fetch_index_usage(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<IndexUsage>, QueryError> {
        let rows = sqlx::query(queries::INDEX_USAGE)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        rows.iter()
            .map(|row| {
                Ok(IndexUsage {
                    name: row.try_get(0).map_err(classify)?,
                    scans: row.try_get(1).map_err(classify)?,
                    size_bytes: row.try_get(2).map_err(classify)?,
                    size_human: row.try_get(3).map_err(classify)?,
                })
            })
            .collect()
    }

    /// Detects implicit FK relationships: `*_id` columns without explicit
    /// constraints whose name matches a table in scope and whose type is
    /// compatible with that table's primary key.
    pub(crate) async fn infer_foreign_keys(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<InferredFk>, QueryError> {
        let columns = self.fetch_profile_columns(schema, table).await?;
        let explicit = self.fetch_explicit_fk_columns(schema, table).await?;
        let pk_index = self.build_pk_index().await?;

        let table_names: HashSet<String> = pk_index.keys().cloned().collect();

        let mut inferred = Vec::new();
        for (column, data_type) in &columns {
            if explicit.contains(column) {
                continue;
            }
            let Some(candidate) = match_fk_naming_pattern(column, &table_names) else {
                continue;
            };
            let Some((pk_column, pk_type)) = pk_index.get(&candidate.referenced_table) else {
                continue;
            };
            if is_type_compatible(data_type, pk_type) {
                inferred.push(InferredFk {
                    column_name: candidate.column_name,
                    referenced_table: candidate.referenced_table,
                    referenced_column: pk_column.clone(),
                    confidence: candidate.confidence.to_string(),
                    reason: candidate.reason,
                });
            }
        }
        Ok(inferred)
    }

    async fn fetch_profile_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<(String, String)>, QueryError> {
        let rows = sqlx::query(queries::PROFILE_COLUMNS)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        rows.iter()
            .map(|row| {
                Ok((
                    row.try_get(0).map_err(classify)?,
                    row.try_get(1).map_err(classify)?,
                ))
            })
            .collect()
    }

    async fn fetch_explicit_fk_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<HashSet<String>, QueryError> {
        let rows = sqlx::query(queries::EXPLICIT_FK_COLUMNS)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>(0).map_err(classify))
            .collect()
    }

    /// Table name → (first PK column, formatted type) across the schemas
    /// in scope. Composite keys contribute their first column only.
    async fn build_pk_index(&self) -> Result<HashMap<String, (String, String)>, QueryError> {
        let (filter, args) = schema_filter(&self.schemas, "n.nspname", 1);
        let sql = queries::PK_INDEX.replace("{filter}", &filter);

        let rows = bind_all(&sql, &args)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        let mut index = HashMap::new();
        for row in &rows {
            let table: String = row.try_get(0).map_err(classify)?;
            let column: String = row.try_get(1).map_err(classify)?;
            let data_type: String = row.try_get(2).map_err(classify)?;
            index.entry(table).or_insert((column, data_type));
        }
        Ok(index)
    }
}

/// Converts pg_stats `n_distinct` to an absolute count:
/// −1 means every value is unique; other negatives are the fraction of rows
/// that are distinct; positives are already absolute.
fn pg_distinct_to_absolute(n_distinct: f64, row_estimate: i64) -> i64 {
    if n_distinct == -1.0 {
        return row_estimate;
    }
    if n_distinct < 0.0 {
        return (-n_distinct * row_estimate as f64).round() as i64;
    }
    n_distinct.round() as i64
}

/// Parses a PostgreSQL text array rendering like `{a,b,"c d"}`. Handles
/// basic quoting and escapes; NULL entries are dropped. Sufficient for the
/// display strings pg_stats produces.
fn parse_pg_array(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "{}" {
        return Vec::new();
    }
    let raw = raw.strip_prefix('{').unwrap_or(raw);
    let raw = raw.strip_suffix('}').unwrap_or(raw);

    let mut result = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut escaped = false;

    for ch in raw.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => in_quote = !in_quote,
            ',' if !in_quote => {
                let value = current.trim();
                if !value.is_empty() && value != "NULL" {
                    result.push(value.to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    let value = current.trim();
    if !value.is_empty() && value != "NULL" {
        result.push(value.to_string());
    }
    result
}

fn parse_pg_float_array(raw: &str) -> Vec<f64> {
    parse_pg_array(raw)
        .iter()
        .filter_map(|v| v.parse::<f64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn n_distinct_minus_one_means_all_unique() {
        assert_eq!(pg_distinct_to_absolute(-1.0, 5000), 5000);
    }

    #[test]
    fn negative_n_distinct_is_a_fraction_of_rows() {
        assert_eq!(pg_distinct_to_absolute(-0.5, 1000), 500);
        assert_eq!(pg_distinct_to_absolute(-0.25, 10), 3);
    }

    #[test]
    fn positive_n_distinct_is_already_absolute() {
        assert_eq!(pg_distinct_to_absolute(42.0, 1000), 42);
        assert_eq!(pg_distinct_to_absolute(41.6, 1000), 42);
    }

    #[test]
    fn parses_simple_arrays() {
        assert_eq!(parse_pg_array("{a,b,c}"), vec!["a", "b", "c"]);
        assert_eq!(parse_pg_array("{}"), Vec::<String>::new());
        assert_eq!(parse_pg_array(""), Vec::<String>::new());
    }

    #[test]
    fn parses_quoted_values_with_commas() {
        assert_eq!(
            parse_pg_array(r#"{"a, with comma",plain}"#),
            vec!["a, with comma", "plain"]
        );
    }

    #[test]
    fn drops_null_entries() {
        assert_eq!(parse_pg_array("{a,NULL,b}"), vec!["a", "b"]);
    }

    #[test]
    fn handles_escaped_quotes() {
        assert_eq!(parse_pg_array(r#"{"say \"hi\""}"#), vec![r#"say "hi""#]);
    }

    #[test]
    fn float_arrays_skip_unparseable_entries() {
        assert_eq!(parse_pg_float_array("{0.5,0.3,x}"), vec![0.5, 0.3]);
    }
}
