//! # strait-core
//!
//! Domain logic and behavioural contracts for the strait gateway.
//!
//! Everything that decides *whether* and *how* an untrusted SQL string may
//! touch the database lives here: the AST whitelist, the column-masking
//! engine, alias resolution, statistics classification, and the query
//! service that chains them together. Database access itself is behind the
//! ports in [`port`] and implemented by the adapter crates.

pub mod alias;
pub mod cardinality;
pub mod config;
pub mod error;
pub mod inference;
pub mod masking;
pub mod port;
pub mod row;
pub mod service;
pub mod validator;
pub mod value;

pub use alias::{extract_alias_map, AliasMap};
pub use cardinality::CardinalityClass;
pub use config::{Config, ConfigError, Transport};
pub use error::QueryError;
pub use inference::{match_fk_naming_pattern, FkCandidate};
pub use masking::{apply_mask, mask_rows, MaskSpec, MaskType};
pub use row::ResultRow;
pub use service::QueryService;
pub use validator::SqlValidator;
pub use value::SqlValue;
