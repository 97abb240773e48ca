//! Error taxonomy shared across the gateway.
//!
//! The variants are the four kinds the boundary sanitiser distinguishes:
//! validation-class errors (safe to show verbatim), timeouts, connection
//! failures, and everything else. Adapters classify their library errors
//! into these variants at their own edge; nothing above the adapters ever
//! inspects a driver error directly.

use thiserror::Error;

/// Errors produced by the query pipeline and the schema explorer.
///
/// The `Display` strings of the validation-class variants are part of the
/// public vocabulary: they are returned to clients unchanged (prefixed with
/// the operation name).
#[derive(Debug, Error)]
pub enum QueryError {
    /// Input was empty, or parsed to zero statements.
    #[error("empty query")]
    EmptyQuery,

    /// Statement kind is outside the SELECT/EXPLAIN whitelist.
    #[error("only SELECT queries are allowed")]
    NotAllowed,

    /// More than one statement in a single input.
    #[error("multiple statements are not allowed")]
    MultiStatement,

    /// The SQL parser rejected the input.
    #[error("failed to parse SQL: {0}")]
    ParseFailed(String),

    /// Explorer lookup for an unknown table.
    #[error("table {0:?} not found")]
    NotFound(String),

    /// Process-side deadline or server-side statement_timeout fired.
    #[error("query timed out")]
    Timeout,

    /// Pool acquisition, TCP or TLS failure other than a timeout.
    #[error("database unavailable: {0}")]
    Connection(String),

    /// Planner errors, permission errors, decode errors, bugs.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl QueryError {
    /// Validation-class errors may be surfaced to clients verbatim.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            QueryError::EmptyQuery
                | QueryError::NotAllowed
                | QueryError::MultiStatement
                | QueryError::ParseFailed(_)
                | QueryError::NotFound(_)
        )
    }
}
