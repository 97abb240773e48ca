//! Classification of driver errors into the gateway taxonomy.

use strait_core::QueryError;

/// PostgreSQL SQLSTATE for a cancelled statement (statement_timeout).
const SQLSTATE_QUERY_CANCELED: &str = "57014";

/// Maps a sqlx error onto the gateway taxonomy. This is the only place the
/// driver error type is inspected; above the adapter every error is one of
/// the four kinds.
pub(crate) fn classify(err: sqlx::Error) -> QueryError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(SQLSTATE_QUERY_CANCELED) => {
            QueryError::Timeout
        }
        sqlx::Error::PoolTimedOut => {
            QueryError::Connection("timed out acquiring a pooled connection".to_string())
        }
        sqlx::Error::PoolClosed => QueryError::Connection("connection pool is closed".to_string()),
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => QueryError::Connection(err.to_string()),
        _ => QueryError::Internal(err.into()),
    }
}
