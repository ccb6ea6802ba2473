/*!
 * Stdio Tool Server
 * Newline-delimited JSON-RPC 2.0 over stdin/stdout
 *
 * Each request runs on its own task; a single writer task serializes the
 * responses so concurrent calls never interleave on stdout. Once input
 * closes and every response is written, pending event deliveries are given
 * their timeout window before the loop returns.
 */

use super::tools::ToolDispatcher;
use crate::monitoring::EventEmitter;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub const SERVER_NAME: &str = "ssf-security-mcp";
pub const SERVER_VERSION: &str = "1.0.0";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Clone)]
pub struct StdioServer {
    dispatcher: Arc<ToolDispatcher>,
    emitter: Option<Arc<EventEmitter>>,
}

impl StdioServer {
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            emitter: None,
        }
    }

    /// Drain this emitter's deliveries when the loop ends
    pub fn with_emitter(mut self, emitter: Arc<EventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Serve stdin/stdout until stdin closes
    pub async fn run(self) -> std::io::Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve newline-delimited requests from `reader`, writing responses to `writer`
    pub async fn serve<R, W>(self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

        let writer_task = tokio::spawn(async move {
            while let Some(response) = rx.recv().await {
                let mut line = match serde_json::to_vec(&response) {
                    Ok(line) => line,
                    Err(e) => {
                        error!(error = %e, "Failed to serialize response");
                        continue;
                    }
                };
                line.push(b'\n');
                writer.write_all(&line).await?;
                writer.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        });

        info!(server = SERVER_NAME, "Tool server listening on stdio");

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let server = self.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle_message(&line).await {
                    // Receiver only closes after a write failure
                    let _ = tx.send(response);
                }
            });
        }

        info!("Input closed, draining pending responses");
        drop(tx);
        let written = match writer_task.await {
            Ok(result) => result,
            Err(e) => Err(std::io::Error::new(std::io::ErrorKind::Other, e)),
        };

        // Request tasks hold sender clones, so every emit has happened by now
        if let Some(emitter) = &self.emitter {
            emitter.drain_deliveries().await;
        }
        written
    }

    /// Handle one raw message; notifications produce no response
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Malformed JSON-RPC message");
                return Some(JsonRpcResponse::failure(Value::Null, PARSE_ERROR, e.to_string()));
            }
        };

        let request: JsonRpcRequest = match serde_json::from_value(raw.clone()) {
            Ok(request) => request,
            Err(e) => {
                let id = raw.get("id").cloned().unwrap_or(Value::Null);
                return Some(JsonRpcResponse::failure(id, INVALID_REQUEST, e.to_string()));
            }
        };

        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "Notification received");
            return None;
        };

        Some(match self.dispatch(&request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id,
                result: None,
                error: Some(error),
            },
        })
    }

    async fn dispatch(&self, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        match request.method.as_str() {
            "initialize" => {
                let protocol = request
                    .params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_PROTOCOL_VERSION);
                Ok(json!({
                    "protocolVersion": protocol,
                    "capabilities": { "tools": {} },
                    "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION }
                }))
            }
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.dispatcher.definitions() })),
            "tools/call" => {
                let name = request
                    .params
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| JsonRpcError {
                        code: INVALID_PARAMS,
                        message: "missing tool name".to_string(),
                    })?;
                let arguments = request.params.get("arguments").unwrap_or(&Value::Null);

                let content = self
                    .dispatcher
                    .call(name, arguments)
                    .await
                    .map_err(|e| JsonRpcError {
                        code: INVALID_PARAMS,
                        message: e.to_string(),
                    })?;
                Ok(json!({ "content": content, "isError": false }))
            }
            other => Err(JsonRpcError {
                code: METHOD_NOT_FOUND,
                message: format!("Method not found: {}", other),
            }),
        }
    }
}
