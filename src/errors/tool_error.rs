use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    InvalidParams,
    Denied,
    NotFound,
    Conflict,
    Retryable,
    Internal,
}

impl ToolErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolErrorKind::InvalidParams => "invalid_params",
            ToolErrorKind::Denied => "denied",
            ToolErrorKind::NotFound => "not_found",
            ToolErrorKind::Conflict => "conflict",
            ToolErrorKind::Retryable => "retryable",
            ToolErrorKind::Internal => "internal",
        }
    }
}

/// Error surfaced to the MCP caller as a failed tool result.
#[derive(Debug, Clone, Serialize)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub retryable: bool,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            hint: None,
            details: None,
            retryable: kind == ToolErrorKind::Retryable,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidParams, "INVALID_PARAMS", message)
    }

    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Denied, "MISSING_CREDENTIALS", message)
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Retryable, "RETRYABLE", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal, "INTERNAL", message)
    }

    /// Plain-text failure report placed in an `isError` tool result.
    pub fn render(&self, tool: &str, action: Option<&str>) -> String {
        let mut lines = vec![
            "FalconError".to_string(),
            format!("tool: {}", tool),
        ];
        if let Some(action) = action {
            lines.push(format!("action: {}", action));
        }
        lines.push(format!("kind: {}", self.kind.as_str()));
        lines.push(format!("code: {}", self.code));
        lines.push(format!("retryable: {}", self.retryable));
        lines.push(format!("message: {}", self.message));
        if let Some(hint) = &self.hint {
            lines.push(format!("hint: {}", hint));
        }
        if let Some(details) = &self.details {
            lines.push(format!("details: {}", details));
        }
        lines.join("\n")
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ToolError {}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::internal(err.to_string())
    }
}
