//! Bounded connection pool.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use strait_core::QueryError;

use crate::error::classify;

/// Pool sizing and recycling limits.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub max_conns: u32,
    pub min_conns: u32,
    pub max_conn_lifetime: Duration,
}

/// Creates the pool and verifies the database is reachable with a bounded
/// startup ping. Connections are liveness-checked before reuse and retired
/// after `max_conn_lifetime`.
pub async fn connect_pool(database_url: &str, opts: PoolOptions) -> Result<PgPool, QueryError> {
    let pool = PgPoolOptions::new()
        .max_connections(opts.max_conns)
        .min_connections(opts.min_conns)
        .max_lifetime(opts.max_conn_lifetime)
        .acquire_timeout(Duration::from_secs(10))
        .test_before_acquire(true)
        .connect(database_url)
        .await
        .map_err(classify)?;

    tokio::time::timeout(Duration::from_secs(10), sqlx::query("SELECT 1").execute(&pool))
        .await
        .map_err(|_| QueryError::Connection("database ping timed out (10s)".to_string()))?
        .map_err(classify)?;

    Ok(pool)
}
