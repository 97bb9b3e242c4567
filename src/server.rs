use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::config::ConfigState;
use crate::lookup;
use crate::protocol::{self, JsonRpcRequest, JsonRpcResponse};

pub const SERVER_NAME: &str = "blame";
pub const TOOL_NAME: &str = "get-project-owner";

/// MCP server over stdio. Holds the config state frozen at startup; every
/// request is answered from it without further I/O.
pub struct McpServer {
    state: ConfigState,
}

impl McpServer {
    pub fn new(state: ConfigState) -> Self {
        McpServer { state }
    }

    /// Process one line from the transport. Returns the serialized reply,
    /// or None when the message was a notification.
    pub fn handle_line(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.dispatch(request)?,
            Err(err) => JsonRpcResponse::error(
                Value::Null,
                protocol::PARSE_ERROR,
                format!("parse error: {}", err),
            ),
        };
        let text = serde_json::to_string(&response).expect("response serialization");
        Some(text)
    }

    fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let JsonRpcRequest {
            jsonrpc,
            id,
            method,
            params,
        } = request;

        // No id means notification; nothing to reply to.
        let id = match id {
            Some(id) => id,
            None => {
                debug!("notification: {}", method);
                return None;
            }
        };

        if jsonrpc != protocol::JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                protocol::INVALID_REQUEST,
                "unsupported jsonrpc version",
            ));
        }

        let response = match method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.initialize_result()),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, self.tools_list_result()),
            "tools/call" => self.tools_call(id, params),
            _ => JsonRpcResponse::error(
                id,
                protocol::METHOD_NOT_FOUND,
                format!("method not found: {}", method),
            ),
        };
        Some(response)
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": protocol::MCP_PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    // The project parameter is constrained to the identifiers discovered at
    // load time. A failed load leaves the enum empty.
    fn tools_list_result(&self) -> Value {
        json!({
            "tools": [{
                "name": TOOL_NAME,
                "description": "Get the owner of a project",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "project": {
                            "type": "string",
                            "enum": self.state.projects(),
                            "description": "One of the defined projects",
                        },
                    },
                    "required": ["project"],
                },
            }],
        })
    }

    fn tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params = params.unwrap_or(Value::Null);

        let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
        if name != TOOL_NAME {
            return JsonRpcResponse::error(
                id,
                protocol::INVALID_PARAMS,
                format!("unknown tool: {}", name),
            );
        }

        let project = match params
            .get("arguments")
            .and_then(|args| args.get("project"))
            .and_then(Value::as_str)
        {
            Some(project) => project,
            None => {
                return JsonRpcResponse::error(
                    id,
                    protocol::INVALID_PARAMS,
                    "missing required argument: project",
                );
            }
        };

        // Ownership failures stay inside the normal result envelope; the
        // response text carries the outcome.
        let text = lookup::lookup(&self.state, project);
        JsonRpcResponse::success(
            id,
            json!({
                "content": [{ "type": "text", "text": text }],
            }),
        )
    }

    /// Serve requests line by line until stdin closes or the process is
    /// interrupted. Each request is handled to completion before the next
    /// is read.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut reader = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut line = String::new();

        loop {
            line.clear();
            tokio::select! {
                result = reader.read_line(&mut line) => {
                    match result {
                        Ok(0) => return Ok(()), // EOF
                        Ok(_) => {
                            let trimmed = line.trim();
                            if trimmed.is_empty() {
                                continue;
                            }
                            debug!("received message: {}", trimmed);
                            if let Some(response) = self.handle_line(trimmed) {
                                stdout.write_all(response.as_bytes()).await?;
                                stdout.write_all(b"\n").await?;
                                stdout.flush().await?;
                            }
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    return Ok(());
                }
            }
        }
    }
}
