//! Executor decorator that forces plan-only responses.

use async_trait::async_trait;
use std::sync::Arc;
use strait_core::port::QueryExecutor;
use strait_core::{QueryError, ResultRow};

use crate::executor::is_explain;

/// Prefixes `EXPLAIN ` onto any non-EXPLAIN input before delegating, so the
/// assistant can reason about queries without running them.
pub struct ExplainOnlyExecutor {
    inner: Arc<dyn QueryExecutor>,
}

impl ExplainOnlyExecutor {
    pub fn new(inner: Arc<dyn QueryExecutor>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl QueryExecutor for ExplainOnlyExecutor {
    async fn execute(&self, sql: &str) -> Result<Vec<ResultRow>, QueryError> {
        if is_explain(sql) {
            self.inner.execute(sql).await
        } else {
            self.inner.execute(&format!("EXPLAIN {sql}")).await
        }
    }
}
