//! Newline-delimited JSON-RPC over stdin/stdout.
//!
//! Logs go to stderr; stdout carries only protocol frames. The loop ends on
//! EOF or on shutdown. A request in flight when the shutdown signal arrives
//! is given up to the drain deadline to finish; after that the process
//! stops waiting and exits.

use crate::protocol::{error_codes, JsonRpcRequest, JsonRpcResponse};
use crate::server::McpServer;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub async fn run_stdio(
    server: Arc<McpServer>,
    shutdown: impl Future<Output = ()>,
) -> std::io::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut shutdown => {
                tracing::info!("shutdown signal received");
                return Ok(());
            }
        };
        let Some(line) = line else {
            // EOF: the client closed the stream.
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let handle = handle_line(&server, &line);
        tokio::pin!(handle);

        // On shutdown the in-flight request may finish within the drain
        // deadline; its response is still written before exit.
        let (response, draining) = tokio::select! {
            response = &mut handle => (response, false),
            _ = &mut shutdown => {
                tracing::info!("shutdown signal received, draining in-flight request");
                match tokio::time::timeout(crate::DRAIN_TIMEOUT, &mut handle).await {
                    Ok(response) => (response, true),
                    Err(_) => {
                        tracing::warn!("drain deadline exceeded, abandoning in-flight request");
                        return Ok(());
                    }
                }
            }
        };

        if let Some(response) = response {
            let mut frame = serde_json::to_vec(&response)?;
            frame.push(b'\n');
            stdout.write_all(&frame).await?;
            stdout.flush().await?;
        }
        if draining {
            return Ok(());
        }
    }
}

async fn handle_line(server: &McpServer, line: &str) -> Option<JsonRpcResponse> {
    match serde_json::from_str::<JsonRpcRequest>(line) {
        Ok(request) => server.handle(request).await,
        Err(err) => Some(JsonRpcResponse::error(
            None,
            error_codes::PARSE_ERROR,
            format!("parse error: {err}"),
        )),
    }
}
