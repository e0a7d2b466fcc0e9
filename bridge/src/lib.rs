//! Ladder bridge: the process edge between an orchestrating agent and
//! the tool registry.
//!
//! Speaks line-delimited JSON-RPC 2.0 over stdio (`initialize`,
//! `tools/list`, `tools/call`, `ping`) and runs the keep-alive ping
//! task. Per-call failures are answered in-band; only a broken stdio
//! stream ends the serve loop.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use ladder_core::dispatch::{DispatchError, Dispatcher, ToolCallRequest};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const SERVER_NAME: &str = "ladder";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// Absent for notifications, which expect no response.
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Handles one decoded request. Returns `None` for notifications.
pub async fn handle_request(
    dispatcher: &Dispatcher,
    request: JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    let id = request.id.clone()?;

    let response = match request.method.as_str() {
        "initialize" => JsonRpcResponse::ok(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
                "capabilities": { "tools": {} },
            }),
        ),
        "ping" => JsonRpcResponse::ok(id, json!({})),
        "tools/list" => {
            let tools: Vec<Value> = dispatcher
                .registry()
                .descriptors()
                .iter()
                .map(|d| {
                    json!({
                        "name": d.name,
                        "description": d.description,
                        "inputSchema": d.input_schema(),
                    })
                })
                .collect();
            JsonRpcResponse::ok(id, json!({ "tools": tools }))
        }
        "tools/call" => {
            let params = request.params.unwrap_or(Value::Null);
            let name = params.get("name").and_then(Value::as_str);
            let Some(name) = name else {
                return Some(JsonRpcResponse::err(
                    id,
                    INVALID_PARAMS,
                    "missing tool name",
                ));
            };
            let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
            let call = ToolCallRequest::new(name, arguments);

            match dispatcher.dispatch(&call).await {
                Ok(parts) => JsonRpcResponse::ok(
                    id,
                    json!({ "content": parts, "isError": false }),
                ),
                Err(e @ (DispatchError::NotFound(_) | DispatchError::InvalidArguments(_))) => {
                    JsonRpcResponse::err(id, INVALID_PARAMS, e.to_string())
                }
                // Handler faults are tool results, not protocol errors.
                Err(e) => JsonRpcResponse::ok(
                    id,
                    json!({
                        "content": [ { "type": "text", "text": e.to_string() } ],
                        "isError": true,
                    }),
                ),
            }
        }
        other => {
            debug!(target: "bridge", method = %other, "Unknown method");
            JsonRpcResponse::err(id, METHOD_NOT_FOUND, format!("unknown method: {other}"))
        }
    };

    Some(response)
}

async fn process_line(dispatcher: &Dispatcher, line: &str) -> Option<JsonRpcResponse> {
    match serde_json::from_str::<JsonRpcRequest>(line) {
        Ok(request) => handle_request(dispatcher, request).await,
        Err(e) => {
            warn!(target: "bridge", error = %e, "Malformed request frame");
            Some(JsonRpcResponse::err(
                Value::Null,
                PARSE_ERROR,
                format!("parse error: {e}"),
            ))
        }
    }
}

/// Serves line-delimited JSON-RPC over stdin/stdout until EOF or a
/// shutdown signal.
pub async fn serve_stdio(
    dispatcher: Arc<Dispatcher>,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut stdout = tokio::io::stdout();

    info!(target: "bridge", tools = dispatcher.registry().len(), "Serving on stdio");

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                info!(target: "bridge", "Shutdown requested, leaving serve loop");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!(target: "bridge", "Input closed, leaving serve loop");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                if let Some(response) = process_line(&dispatcher, &line).await {
                    let mut frame = serde_json::to_string(&response)
                        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                    frame.push('\n');
                    stdout.write_all(frame.as_bytes()).await?;
                    stdout.flush().await?;
                }
            }
        }
    }

    Ok(())
}

/// Periodically pings the deployment health URL so hosting platforms do
/// not idle the process out. One failed ping is logged and the loop
/// continues; a shutdown signal stops it promptly.
pub async fn keep_alive(url: String, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; skip it so the first ping waits
    // a full period.
    ticker.tick().await;

    info!(target: "keep_alive", url = %url, period_secs = period.as_secs(), "Keep-alive task started");

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                info!(target: "keep_alive", "Keep-alive task stopping");
                break;
            }
            _ = ticker.tick() => {
                match client.get(&url).send().await {
                    Ok(resp) if resp.status().is_success() => {
                        debug!(target: "keep_alive", "Ping ok");
                    }
                    Ok(resp) => {
                        warn!(target: "keep_alive", status = %resp.status(), "Ping returned non-success");
                    }
                    Err(e) => {
                        warn!(target: "keep_alive", error = %e, "Ping failed");
                    }
                }
            }
        }
    }
}
