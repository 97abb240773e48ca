//! # strait-mcp
//!
//! The tool-call boundary: JSON-RPC protocol types, the three tools
//! (`discover`, `describe_table`, `query`) with the error sanitiser, a
//! newline-delimited stdio transport, and an authenticated HTTP transport
//! with health, readiness and metrics endpoints.

pub mod http;
pub mod metrics;
pub mod protocol;
pub mod server;
pub mod stdio;
pub mod tools;

/// How long in-flight requests may keep running after the shutdown signal
/// before the transports stop waiting for them.
pub(crate) const DRAIN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

pub use metrics::PromInstruments;
pub use protocol::{JsonRpcRequest, JsonRpcResponse};
pub use server::McpServer;
pub use tools::ToolRouter;
