//! # strait-pg
//!
//! PostgreSQL adapter: the bounded connection pool, the read-only query
//! executor (transaction envelope, row cap, dual-layer timeout), and the
//! catalog explorer with its deep-profiling fetchers.

mod error;
mod explain_only;
mod explorer;
mod fetchers;
mod filters;
mod pool;
mod queries;
mod rows;

pub mod executor;

pub use executor::PgExecutor;
pub use explain_only::ExplainOnlyExecutor;
pub use explorer::PgExplorer;
pub use pool::{connect_pool, PoolOptions};
pub use rows::decode_row;
