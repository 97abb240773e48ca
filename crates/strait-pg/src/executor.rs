//! Read-only execution envelope.
//!
//! Every admitted statement runs inside a transaction with
//! `SET TRANSACTION READ ONLY` (unless disabled for integration tests) and
//! `SET LOCAL statement_timeout`. The process-side deadline and the
//! server-side timeout form the dual cancellation layer: the process timer
//! frees the caller even when the server stalls, and the server timeout
//! aborts the query even when process-side cancellation is delayed.

use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use strait_core::port::QueryExecutor;
use strait_core::{QueryError, ResultRow};

use crate::error::classify;
use crate::rows::decode_row;

pub struct PgExecutor {
    pool: PgPool,
    read_only: bool,
    max_rows: u32,
    query_timeout: Duration,
}

impl PgExecutor {
    pub fn new(pool: PgPool, read_only: bool, max_rows: u32, query_timeout: Duration) -> Self {
        Self {
            pool,
            read_only,
            max_rows,
            query_timeout,
        }
    }

    /// EXPLAIN statements cannot be wrapped in a subquery; everything else
    /// gets the server-enforced row cap as an outer LIMIT.
    fn wrap(&self, sql: &str) -> String {
        if is_explain(sql) {
            sql.to_string()
        } else {
            format!("SELECT * FROM ({sql}) AS _q LIMIT {}", self.max_rows)
        }
    }

    async fn run(&self, sql: &str) -> Result<Vec<ResultRow>, QueryError> {
        let wrapped = self.wrap(sql);

        let mut tx = self.pool.begin().await.map_err(classify)?;

        if self.read_only {
            sqlx::query("SET TRANSACTION READ ONLY")
                .execute(&mut *tx)
                .await
                .map_err(classify)?;
        }

        // SET LOCAL scopes to this transaction only; the server cancels the
        // statement even if process-side cancellation never arrives.
        let timeout_ms = self.query_timeout.as_millis();
        sqlx::query(&format!("SET LOCAL statement_timeout = '{timeout_ms}'"))
            .execute(&mut *tx)
            .await
            .map_err(classify)?;

        let pg_rows = sqlx::query(&wrapped)
            .fetch_all(&mut *tx)
            .await
            .map_err(classify)?;

        let mut results = Vec::with_capacity(pg_rows.len());
        for row in &pg_rows {
            results.push(decode_row(row)?);
        }

        tx.commit().await.map_err(classify)?;
        Ok(results)
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn execute(&self, sql: &str) -> Result<Vec<ResultRow>, QueryError> {
        match tokio::time::timeout(self.query_timeout, self.run(sql)).await {
            Ok(result) => result,
            Err(_) => Err(QueryError::Timeout),
        }
    }
}

/// True when the trimmed, uppercased SQL starts with `EXPLAIN`.
pub(crate) fn is_explain(sql: &str) -> bool {
    sql.trim_start()
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("EXPLAIN"))
}
