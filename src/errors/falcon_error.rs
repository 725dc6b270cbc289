use crate::errors::{ToolError, ToolErrorKind};
use std::time::Duration;
use thiserror::Error;

/// Failure modes of the Falcon API client.
///
/// Every operation on [`crate::falcon::FalconClient`] resolves to a value or to
/// exactly one of these variants. Nothing is retried inside the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FalconError {
    /// Token exchange failed, or an API call returned 401/403.
    #[error("Authentication failed: {message}")]
    Authentication { status: Option<u16>, message: String },

    /// HTTP 429. The caller should wait `retry_after` before trying again.
    #[error("Rate limit exceeded; retry after {}s", .retry_after.as_secs())]
    RateLimit { retry_after: Duration },

    /// Any other non-2xx response.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Local precondition failure, raised before any network call.
    #[error("{0}")]
    Validation(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl FalconError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            FalconError::RateLimit { .. } | FalconError::Transport(_) => true,
            FalconError::Api { status, .. } => *status >= 500,
            FalconError::Authentication { .. }
            | FalconError::Validation(_)
            | FalconError::Decode(_) => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FalconError::Authentication { status, .. } => *status,
            FalconError::RateLimit { .. } => Some(429),
            FalconError::Api { status, .. } => Some(*status),
            FalconError::Validation(_) | FalconError::Transport(_) | FalconError::Decode(_) => {
                None
            }
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            FalconError::RateLimit { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FalconError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return FalconError::Decode(err.to_string());
        }
        FalconError::Transport(err.to_string())
    }
}

impl From<FalconError> for ToolError {
    fn from(err: FalconError) -> Self {
        let message = err.to_string();
        match err {
            FalconError::Authentication { status, .. } => {
                ToolError::new(ToolErrorKind::Denied, "AUTHENTICATION_FAILED", message)
                    .with_hint("Check the tenant client id/secret and the API scopes granted to it.")
                    .with_details(serde_json::json!({ "status": status }))
            }
            FalconError::RateLimit { retry_after } => {
                ToolError::new(ToolErrorKind::Retryable, "RATE_LIMITED", message)
                    .with_hint(format!("Wait {}s before retrying.", retry_after.as_secs()))
                    .with_details(serde_json::json!({ "retry_after_secs": retry_after.as_secs() }))
            }
            FalconError::Api { status, .. } => {
                let kind = match status {
                    404 => ToolErrorKind::NotFound,
                    409 => ToolErrorKind::Conflict,
                    s if s >= 500 => ToolErrorKind::Retryable,
                    _ => ToolErrorKind::InvalidParams,
                };
                ToolError::new(kind, "API_ERROR", message)
                    .with_details(serde_json::json!({ "status": status }))
            }
            FalconError::Validation(_) => ToolError::invalid_params(message),
            FalconError::Transport(_) => ToolError::retryable(message),
            FalconError::Decode(_) => ToolError::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_is_retryable_and_maps_to_retryable_tool_error() {
        let err = FalconError::RateLimit {
            retry_after: Duration::from_secs(30),
        };
        assert!(err.is_retryable());
        assert_eq!(err.status(), Some(429));

        let tool: ToolError = err.into();
        assert_eq!(tool.kind, ToolErrorKind::Retryable);
        assert_eq!(tool.code, "RATE_LIMITED");
        assert!(tool.retryable);
        assert_eq!(
            tool.details.as_ref().and_then(|d| d.get("retry_after_secs")),
            Some(&serde_json::json!(30))
        );
    }

    #[test]
    fn authentication_maps_to_denied_and_is_not_retryable() {
        let err = FalconError::Authentication {
            status: Some(401),
            message: "401 Unauthorized".to_string(),
        };
        assert!(!err.is_retryable());
        let tool: ToolError = err.into();
        assert_eq!(tool.kind, ToolErrorKind::Denied);
        assert!(!tool.retryable);
        assert_eq!(tool.message, "Authentication failed: 401 Unauthorized");
    }

    #[test]
    fn api_error_kind_follows_status() {
        let not_found: ToolError = FalconError::Api {
            status: 404,
            message: "missing".to_string(),
        }
        .into();
        assert_eq!(not_found.kind, ToolErrorKind::NotFound);

        let server: ToolError = FalconError::Api {
            status: 503,
            message: "busy".to_string(),
        }
        .into();
        assert_eq!(server.kind, ToolErrorKind::Retryable);

        let bad: ToolError = FalconError::Api {
            status: 400,
            message: "bad filter".to_string(),
        }
        .into();
        assert_eq!(bad.kind, ToolErrorKind::InvalidParams);
        assert_eq!(bad.message, "bad filter");
    }

    #[test]
    fn validation_maps_to_invalid_params() {
        let tool: ToolError = FalconError::validation("filter is required").into();
        assert_eq!(tool.kind, ToolErrorKind::InvalidParams);
        assert_eq!(tool.code, "INVALID_PARAMS");
    }
}
