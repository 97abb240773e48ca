//! Behavioural contracts between the domain and its adapters.
//!
//! The gateway composes implementations of these traits once at startup
//! (base implementations plus optional decorators); nothing is rewired at
//! runtime.

pub mod explorer;

pub use explorer::{
    CheckConstraint, ColumnInfo, ColumnStats, DiscoveryResult, ForeignKey, IndexInfo, IndexUsage,
    InferredFk, SchemaInfo, SchemaOverview, TableDetail, TableInfo,
};

use crate::error::QueryError;
use crate::row::ResultRow;
use async_trait::async_trait;

/// SQL admission control. Synchronous: parsing needs no I/O.
pub trait QueryValidator: Send + Sync {
    fn validate(&self, sql: &str) -> Result<(), QueryError>;
}

/// Bounded, read-only SQL execution. Never returns partial rows: either
/// the complete capped set or an error.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<Vec<ResultRow>, QueryError>;
}

/// One audit record per executed query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditEntry {
    /// Tool that initiated the query (e.g. `query`).
    pub tool: String,
    pub sql: String,
    pub rows_returned: usize,
    pub duration_ms: u64,
    /// Full error text for operators; `None` on success.
    pub error: Option<String>,
}

/// Append-structured audit sink. Writes are best-effort: implementations
/// must never fail the caller's request over audit I/O.
pub trait QueryAuditor: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

/// Discards every entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditor;

impl QueryAuditor for NoopAuditor {
    fn record(&self, _entry: AuditEntry) {}
}

/// Counter/histogram recorder for the query path. Instruments handle their
/// own concurrency; callers never synchronise around them.
pub trait Instrumentation: Send + Sync {
    fn incr_query_count(&self);
    fn incr_query_errors(&self);
    fn record_query_duration_ms(&self, ms: f64);
    fn record_tool_duration_ms(&self, tool: &str, ms: f64);
}

/// Records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInstrumentation;

impl Instrumentation for NoopInstrumentation {
    fn incr_query_count(&self) {}
    fn incr_query_errors(&self) {}
    fn record_query_duration_ms(&self, _ms: f64) {}
    fn record_tool_duration_ms(&self, _tool: &str, _ms: f64) {}
}

/// Catalog introspection, optionally policy-decorated.
#[async_trait]
pub trait SchemaExplorer: Send + Sync {
    async fn list_schemas(&self) -> Result<Vec<SchemaInfo>, QueryError>;
    async fn list_tables(&self) -> Result<Vec<TableInfo>, QueryError>;
    async fn describe_table(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<TableDetail, QueryError>;
    async fn discover(&self) -> Result<DiscoveryResult, QueryError>;
}
