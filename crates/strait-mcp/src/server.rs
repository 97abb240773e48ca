//! JSON-RPC method dispatch, shared by both transports.

use crate::protocol::{
    error_codes, CallToolParams, JsonRpcRequest, JsonRpcResponse, ListToolsResult, ServerInfo,
    JSONRPC_VERSION, MCP_PROTOCOL_VERSION,
};
use crate::tools::ToolRouter;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use strait_core::port::Instrumentation;
use tracing::Instrument;

/// Stateless per-request dispatcher. Multiple tool calls may be in flight
/// simultaneously under the HTTP transport; nothing here assumes
/// serialisation by the framing layer.
pub struct McpServer {
    name: String,
    version: String,
    router: ToolRouter,
    instruments: Arc<dyn Instrumentation>,
}

impl McpServer {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        router: ToolRouter,
        instruments: Arc<dyn Instrumentation>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            router,
            instruments,
        }
    }

    /// Handles one request. Returns `None` for notifications, which get no
    /// response on the wire.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id,
                error_codes::INVALID_PARAMS,
                "unsupported jsonrpc version",
            ));
        }

        match request.method.as_str() {
            "initialize" => Some(JsonRpcResponse::success(
                request.id,
                json!({
                    "protocolVersion": MCP_PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": ServerInfo {
                        name: self.name.clone(),
                        version: self.version.clone(),
                    },
                }),
            )),

            "notifications/initialized" => None,

            "ping" => Some(JsonRpcResponse::success(request.id, json!({}))),

            "tools/list" => {
                let result = ListToolsResult {
                    tools: self.router.definitions(),
                };
                Some(JsonRpcResponse::success(
                    request.id,
                    serde_json::to_value(result).unwrap_or_default(),
                ))
            }

            "tools/call" => Some(self.handle_tool_call(request).await),

            _ => {
                // Unknown notifications are dropped; unknown requests get
                // a method-not-found error.
                request.id.map(|id| {
                    JsonRpcResponse::error(
                        Some(id),
                        error_codes::METHOD_NOT_FOUND,
                        format!("method not found: {}", request.method),
                    )
                })
            }
        }
    }

    async fn handle_tool_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: CallToolParams = match request
            .params
            .map(serde_json::from_value)
            .transpose()
        {
            Ok(Some(params)) => params,
            Ok(None) => {
                return JsonRpcResponse::error(
                    request.id,
                    error_codes::INVALID_PARAMS,
                    "missing params",
                )
            }
            Err(err) => {
                return JsonRpcResponse::error(
                    request.id,
                    error_codes::INVALID_PARAMS,
                    format!("invalid params: {err}"),
                )
            }
        };

        let span = tracing::info_span!("mcp.tool.call", mcp.tool = %params.name);

        let start = Instant::now();
        let result = self
            .router
            .call(&params.name, &params.arguments)
            .instrument(span)
            .await;
        let duration_ms = start.elapsed().as_millis() as f64;

        self.instruments
            .record_tool_duration_ms(&params.name, duration_ms);

        if result.is_error() {
            tracing::error!(mcp.tool = %params.name, duration_ms, "tool call failed");
        } else {
            tracing::info!(mcp.tool = %params.name, duration_ms, "tool call");
        }

        match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(err) => JsonRpcResponse::error(
                request.id,
                error_codes::INTERNAL_ERROR,
                format!("encoding tool result: {err}"),
            ),
        }
    }
}
