use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::constants::limits::LOG_ARGS_MAX_STRING;
use crate::errors::ToolError;
use crate::falcon::{create_client, FalconClient};
use crate::services::credentials::CredentialSource;
use crate::services::logger::Logger;
use crate::utils::redact::redact_object;
use crate::utils::suggest::suggest;

/// One MCP tool. Receives a client already bound to the caller's tenant.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError>;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, handlers: HashMap<String, Arc<dyn ToolHandler>>) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    pub fn has_tool(&self, tool: &str) -> bool {
        self.handlers.contains_key(tool)
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    fn unknown_tool(&self, tool: &str) -> ToolError {
        let suggestions = suggest(tool, &self.tool_names(), 3);
        let hint = if suggestions.is_empty() {
            "Call tools/list to see the available tools".to_string()
        } else {
            format!("Did you mean: {}?", suggestions.join(", "))
        };
        ToolError::invalid_params(format!("Unknown tool: {}", tool)).with_hint(hint)
    }

    /// Resolves credentials, binds a fresh client for this call only, and runs
    /// the handler. Successful results are wrapped as `{"success": true, ...}`.
    pub async fn execute(
        &self,
        tool: &str,
        args: Value,
        credentials: &CredentialSource,
    ) -> Result<Value, ToolError> {
        let Some(handler) = self.handlers.get(tool).cloned() else {
            return Err(self.unknown_tool(tool));
        };
        let started = Instant::now();
        let trace_id = uuid::Uuid::new_v4().to_string();
        let action = args.get("action").cloned().unwrap_or(Value::Null);

        self.logger.debug(
            "tool call",
            Some(&serde_json::json!({
                "tool": tool,
                "trace_id": trace_id,
                "args": redact_object(&args, LOG_ARGS_MAX_STRING, None),
            })),
        );

        let outcome = async {
            let client = create_client(credentials.resolve()?)?;
            handler.handle(&client, args).await
        }
        .await;

        let duration_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(result) => {
                self.logger.info(
                    "tool call finished",
                    Some(&serde_json::json!({
                        "tool": tool,
                        "action": action,
                        "trace_id": trace_id,
                        "duration_ms": duration_ms,
                    })),
                );
                Ok(wrap_success(result))
            }
            Err(err) => {
                self.logger.warn(
                    "tool call failed",
                    Some(&serde_json::json!({
                        "tool": tool,
                        "action": action,
                        "trace_id": trace_id,
                        "duration_ms": duration_ms,
                        "kind": err.kind.as_str(),
                        "code": err.code,
                    })),
                );
                Err(err)
            }
        }
    }
}

pub fn wrap_success(result: Value) -> Value {
    match result {
        Value::Object(mut map) => {
            map.insert("success".to_string(), Value::Bool(true));
            Value::Object(map)
        }
        other => serde_json::json!({ "success": true, "result": other }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::falcon::TenantCredentials;
    use crate::services::logger::LogLevel;

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn handle(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
            Ok(serde_json::json!({ "base_url": client.base_url(), "args": args }))
        }
    }

    fn executor() -> ToolExecutor {
        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert("falcon_echo".to_string(), Arc::new(Echo));
        ToolExecutor::new(Logger::with_level("test", LogLevel::Error), handlers)
    }

    #[tokio::test]
    async fn binds_client_to_request_credentials() {
        let creds = TenantCredentials::new("id", "secret").with_base_url("us-2");
        let out = executor()
            .execute(
                "falcon_echo",
                serde_json::json!({"action": "x"}),
                &CredentialSource::Request(Some(creds)),
            )
            .await
            .unwrap();
        assert_eq!(out["success"], true);
        assert_eq!(out["base_url"], "https://api.us-2.crowdstrike.com");
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_handler() {
        let err = executor()
            .execute("falcon_echo", Value::Null, &CredentialSource::Request(None))
            .await
            .unwrap_err();
        assert_eq!(err.code, "MISSING_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_tool_suggests_close_name() {
        let err = executor()
            .execute("falcon_ecko", Value::Null, &CredentialSource::Request(None))
            .await
            .unwrap_err();
        assert_eq!(err.code, "INVALID_PARAMS");
        assert!(err.hint.unwrap_or_default().contains("falcon_echo"));
    }

    #[test]
    fn wrap_success_keeps_object_fields() {
        let out = wrap_success(serde_json::json!({"ids": ["a"]}));
        assert_eq!(out, serde_json::json!({"ids": ["a"], "success": true}));
        let out = wrap_success(serde_json::json!(["a"]));
        assert_eq!(out, serde_json::json!({"success": true, "result": ["a"]}));
    }
}
