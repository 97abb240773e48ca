//! Query orchestration: validate → execute → audit → mask.

use crate::alias::extract_alias_map;
use crate::error::QueryError;
use crate::masking::{mask_rows, MaskSpec};
use crate::port::{AuditEntry, Instrumentation, QueryAuditor, QueryExecutor, QueryValidator};
use crate::row::ResultRow;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Drives one SQL string through the safety pipeline.
///
/// Built once at startup from the composed validator, executor, auditor and
/// mask spec; holds no per-call state.
pub struct QueryService {
    validator: Arc<dyn QueryValidator>,
    executor: Arc<dyn QueryExecutor>,
    auditor: Arc<dyn QueryAuditor>,
    masks: MaskSpec,
    instruments: Arc<dyn Instrumentation>,
}

impl QueryService {
    pub fn new(
        validator: Arc<dyn QueryValidator>,
        executor: Arc<dyn QueryExecutor>,
        auditor: Arc<dyn QueryAuditor>,
        masks: MaskSpec,
        instruments: Arc<dyn Instrumentation>,
    ) -> Self {
        Self {
            validator,
            executor,
            auditor,
            masks,
            instruments,
        }
    }

    /// Validates and, if admitted, executes `sql`. `tool` names the calling
    /// tool for the audit trail; it is threaded explicitly rather than
    /// smuggled through ambient state.
    pub async fn execute(&self, tool: &str, sql: &str) -> Result<Vec<ResultRow>, QueryError> {
        let span = tracing::info_span!(
            "query.execute",
            db.system = "postgresql",
            db.operation = "query",
            db.statement = %sql,
        );
        self.execute_inner(tool, sql).instrument(span).await
    }

    async fn execute_inner(&self, tool: &str, sql: &str) -> Result<Vec<ResultRow>, QueryError> {
        // Rejected SQL was never executed; it gets no audit entry.
        if let Err(err) = self.validator.validate(sql) {
            tracing::warn!(error = %err, error_type = "validation_error", "query validation rejected");
            self.instruments.incr_query_errors();
            return Err(err);
        }

        let start = Instant::now();
        let result = self.executor.execute(sql).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        // Latency is measured for successes and failures alike.
        self.instruments.record_query_duration_ms(duration_ms as f64);

        let (rows_returned, error_text) = match &result {
            Ok(rows) => (rows.len(), None),
            Err(err) => (0, Some(err.to_string())),
        };
        self.auditor.record(AuditEntry {
            tool: tool.to_string(),
            sql: sql.to_string(),
            rows_returned,
            duration_ms,
            error: error_text,
        });

        let mut rows = match result {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!(error = %err, "query execution failed");
                self.instruments.incr_query_errors();
                return Err(err);
            }
        };

        self.instruments.incr_query_count();
        tracing::debug!(rows = rows.len(), duration_ms, "query completed");

        if !self.masks.is_empty() {
            let aliases = extract_alias_map(sql);
            mask_rows(&mut rows, &self.masks, &aliases);
        }

        Ok(rows)
    }
}
