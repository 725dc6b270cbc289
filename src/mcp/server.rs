use crate::app::App;
use crate::errors::{ErrorCode, McpError, ToolError};
use crate::mcp::catalog::{list_tools, validate_tool_args};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::services::credentials::CredentialSource;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

const PROTOCOL_VERSION: &str = "2025-06-18";
const SERVER_NAME: &str = "falcon-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP request dispatcher shared by the stdio and HTTP transports.
pub struct McpServer {
    app: Arc<App>,
}

impl McpServer {
    pub fn new() -> Result<Self, ToolError> {
        let app = App::initialize()?;
        Ok(Self::with_app(Arc::new(app)))
    }

    pub fn with_app(app: Arc<App>) -> Self {
        Self { app }
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
        })
    }

    fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": list_tools() })
    }

    /// Runs one tool call. Tool failures come back as `isError` results, not
    /// JSON-RPC errors, so the calling agent can read and react to them.
    async fn handle_tools_call(
        &self,
        name: &str,
        args: Value,
        credentials: &CredentialSource,
    ) -> Value {
        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };
        let action = args
            .get("action")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let outcome = match validate_tool_args(name, &args) {
            Ok(()) => {
                self.app
                    .tool_executor
                    .execute(name, args, credentials)
                    .await
            }
            Err(err) => Err(err),
        };

        match outcome {
            Ok(result) => {
                let text = serde_json::to_string_pretty(&result)
                    .unwrap_or_else(|_| result.to_string());
                serde_json::json!({
                    "content": [{"type": "text", "text": text}],
                })
            }
            Err(err) => serde_json::json!({
                "content": [{"type": "text", "text": err.render(name, action.as_deref())}],
                "isError": true,
            }),
        }
    }

    /// Dispatches a parsed request. Notifications yield no response.
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        credentials: &CredentialSource,
    ) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        match request.method.as_str() {
            "notifications/initialized" => {
                id.map(|id| JsonRpcResponse::success(id, serde_json::json!({})))
            }
            _ if request.method.starts_with("notifications/") && id.is_none() => None,
            "initialize" => id.map(|id| JsonRpcResponse::success(id, self.handle_initialize())),
            "ping" => id.map(|id| JsonRpcResponse::success(id, serde_json::json!({}))),
            "tools/list" => id.map(|id| JsonRpcResponse::success(id, self.handle_tools_list())),
            "tools/call" => {
                let id = id?;
                let params = request.params.as_object().cloned().unwrap_or_default();
                let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
                if name.is_empty() {
                    return Some(JsonRpcResponse::from_error(
                        id,
                        McpError::invalid_params("Missing tool name"),
                    ));
                }
                let args = params.get("arguments").cloned().unwrap_or(Value::Null);
                let result = self.handle_tools_call(name, args, credentials).await;
                Some(JsonRpcResponse::success(id, result))
            }
            _ => id.map(|id| {
                JsonRpcResponse::from_error(
                    id,
                    McpError::new(ErrorCode::MethodNotFound, "Method not found"),
                )
            }),
        }
    }

    /// Parses one raw JSON-RPC message and dispatches it.
    pub async fn handle_message(
        &self,
        raw: &str,
        credentials: &CredentialSource,
    ) -> Option<JsonRpcResponse> {
        let parsed: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(_) => return Some(JsonRpcResponse::parse_error()),
        };
        let request: JsonRpcRequest = match serde_json::from_value(parsed) {
            Ok(req) => req,
            Err(_) => return Some(JsonRpcResponse::invalid_request()),
        };
        self.handle_request(request, credentials).await
    }

    /// Newline-delimited JSON-RPC over stdin/stdout. Credentials come from the
    /// process environment on every call.
    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin).lines();
        let mut writer = BufWriter::new(stdout);
        let credentials = CredentialSource::Environment;

        self.app.logger.info("stdio transport ready", None);
        while let Some(line) = reader
            .next_line()
            .await
            .map_err(|err| ToolError::internal(err.to_string()))?
        {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_message(&line, &credentials).await {
                let payload = serde_json::to_string(&response).unwrap_or_default();
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }
}

pub async fn run_stdio() -> Result<(), ToolError> {
    let server = McpServer::new()?;
    server.run_stdio().await
}
