//! MCP Server implementation for the knowledge base bridge
//!
//! Implements the Model Context Protocol (JSON-RPC 2.0) directly, without
//! an SDK. Transport-agnostic: the stdio and SSE transports both feed
//! lines into [`McpServer::handle_line`].

use serde_json::{json, Value};

use super::handlers::dispatch_tool;
use super::jsonrpc::*;
use super::state::ServerState;
use super::tools::tool_definitions;
use crate::core::session::SessionContext;

const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP request handler shared by every session
#[derive(Clone)]
pub struct McpServer {
    state: ServerState,
}

impl McpServer {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Handle one raw message; `None` when nothing should be sent back
    pub async fn handle_line(&self, session: &SessionContext, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(session_id = %session.id(), error = %e, "unparseable message");
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(req) => req,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    id,
                    INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ));
            }
        };

        self.handle_request(session, &request).await
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(
        &self,
        session: &SessionContext,
        request: &JsonRpcRequest,
    ) -> Option<JsonRpcResponse> {
        // Notifications (no id) don't get responses
        if request.is_notification() {
            match request.method.as_str() {
                "notifications/initialized" => {
                    tracing::info!(session_id = %session.id(), "client initialized");
                }
                "notifications/cancelled" => {
                    tracing::debug!(session_id = %session.id(), "request cancelled by client");
                }
                other => {
                    tracing::debug!(session_id = %session.id(), method = other, "unknown notification");
                }
            }
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        let result = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "tools/list" => Ok(tool_definitions()),
            "tools/call" => self.handle_call_tool(session, &request.params).await,
            "ping" => Ok(json!({})),
            _ => Err((METHOD_NOT_FOUND, format!("Method not found: {}", request.method))),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err((code, msg)) => JsonRpcResponse::error(id, code, msg),
        })
    }

    fn handle_initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {
                    "listChanged": false
                },
                "logging": {}
            },
            "serverInfo": {
                "name": "kbridge",
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": "kbridge searches a remote knowledge base. Start with get_dataset_tree to find dataset ids, then search_dataset or multi_dataset_search. Use view_collection_content to read a whole document and expand_search_keywords when a search finds too little."
        })
    }

    async fn handle_call_tool(
        &self,
        session: &SessionContext,
        params: &Value,
    ) -> Result<Value, (i64, String)> {
        let name = params["name"]
            .as_str()
            .ok_or((INVALID_PARAMS, "Missing tool name".to_string()))?;
        let arguments = &params["arguments"];

        let started = std::time::Instant::now();
        let result = dispatch_tool(&self.state, session, name, arguments)
            .await
            .ok_or_else(|| (INVALID_PARAMS, format!("Unknown tool: {}", name)))?;

        match result {
            Ok(text) => {
                tracing::info!(
                    session_id = %session.id(),
                    tool = name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "tool call finished"
                );
                Ok(json!({
                    "content": [{
                        "type": "text",
                        "text": text
                    }]
                }))
            }
            Err(e) => {
                tracing::warn!(session_id = %session.id(), tool = name, error = %e, "tool call failed");
                Ok(json!({
                    "content": [{
                        "type": "text",
                        "text": format!("❌ {}", e)
                    }],
                    "isError": true
                }))
            }
        }
    }
}
