//! Catalog exploration.
//!
//! `describe_table` composes the base description (columns, keys, indexes)
//! with the deeper profiling data: per-column statistics, sample rows,
//! index usage, stats freshness, and inferred foreign keys. Profiling
//! fetches are enrichment: when they fail the detail is returned without
//! them rather than failing the call.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use strait_core::port::{
    DiscoveryResult, SchemaExplorer, SchemaInfo, SchemaOverview, TableDetail, TableInfo,
};
use strait_core::QueryError;

#[derive(Clone)]
pub struct PgExplorer {
    pub(crate) pool: PgPool,
    /// Allow-list; empty means all non-system schemas.
    pub(crate) schemas: Vec<String>,
}

impl PgExplorer {
    pub fn new(pool: PgPool, schemas: Vec<String>) -> Self {
        Self { pool, schemas }
    }
}

#[async_trait]
impl SchemaExplorer for PgExplorer {
    async fn list_schemas(&self) -> Result<Vec<SchemaInfo>, QueryError> {
        self.fetch_schemas().await
    }

    async fn list_tables(&self) -> Result<Vec<TableInfo>, QueryError> {
        self.fetch_tables().await
    }

    async fn discover(&self) -> Result<DiscoveryResult, QueryError> {
        let schemas = self.fetch_schemas().await?;
        let tables = self.fetch_tables().await?;

        let mut overviews: Vec<SchemaOverview> = schemas
            .into_iter()
            .map(|s| SchemaOverview {
                name: s.name,
                tables: Vec::new(),
            })
            .collect();
        for table in tables {
            if let Some(overview) = overviews.iter_mut().find(|o| o.name == table.schema) {
                overview.tables.push(table);
            }
        }

        Ok(DiscoveryResult { schemas: overviews })
    }

    async fn describe_table(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<TableDetail, QueryError> {
        let (schema, comment) = match schema {
            Some(schema) => (
                schema.to_string(),
                self.fetch_table_comment(schema, table).await?,
            ),
            None => self.fetch_table_meta(table).await?,
        };

        let mut detail = TableDetail {
            schema: schema.clone(),
            name: table.to_string(),
            comment,
            ..TableDetail::default()
        };

        // Views and some system objects carry no size info.
        if let Ok((rows, bytes, human)) = self.fetch_table_size(&schema, table).await {
            detail.row_estimate = rows;
            detail.total_bytes = bytes;
            detail.size_human = human;
        }

        detail.columns = self.fetch_columns(&schema, table).await?;
        self.mark_primary_keys(&mut detail).await?;

        // Stats may simply not exist yet (never analyzed).
        if let Err(err) = self
            .attach_column_stats(&schema, table, &mut detail)
            .await
        {
            tracing::debug!(error = %err, table, "column stats unavailable");
        }

        detail.foreign_keys = self.fetch_foreign_keys(&schema, table).await?;
        detail.indexes = self.fetch_indexes(&schema, table).await?;

        match self.fetch_check_constraints(&schema, table).await {
            Ok(checks) => detail.check_constraints = checks,
            Err(err) => tracing::debug!(error = %err, table, "check constraints unavailable"),
        }

        detail.stats_age = self.fetch_stats_age(&schema, table).await;
        detail.stats_age_warning = match detail.stats_age {
            Some(ts) => {
                let age = Utc::now().signed_duration_since(ts);
                if age.num_days() > 7 {
                    format!(
                        "Statistics are {} days old. Consider running ANALYZE on this table.",
                        age.num_days()
                    )
                } else {
                    String::new()
                }
            }
            None => "No ANALYZE has been run on this table. Statistics may be missing or inaccurate."
                .to_string(),
        };

        match self.fetch_sample_rows(&schema, table).await {
            Ok(rows) => detail.sample_rows = rows,
            Err(err) => tracing::debug!(error = %err, table, "sample rows unavailable"),
        }

        match self.fetch_index_usage(&schema, table).await {
            Ok(usage) => detail.index_usage = usage,
            Err(err) => tracing::debug!(error = %err, table, "index usage unavailable"),
        }

        match self.infer_foreign_keys(&schema, table).await {
            Ok(inferred) => detail.inferred_fks = inferred,
            Err(err) => tracing::debug!(error = %err, table, "fk inference unavailable"),
        }

        Ok(detail)
    }
}
