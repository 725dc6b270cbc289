//! Real Time Response sessions and commands.
//!
//! Sessions live at the vendor. Nothing here tracks whether a session id is
//! still active; a closed or unknown session fails at the vendor and comes
//! back through the generic API error path.

use crate::errors::FalconError;
use crate::falcon::client::{resources, FalconClient};
use crate::falcon::query::endpoint;
use crate::falcon::types::{Ack, Extra};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SESSIONS: &str = "/real-time-response/entities/sessions/v1";
const SESSIONS_GET: &str = "/real-time-response/entities/sessions/GET/v1";
const COMMAND: &str = "/real-time-response/entities/command/v1";
const ACTIVE_RESPONDER_COMMAND: &str = "/real-time-response/entities/active-responder-command/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtrSession {
    pub session_id: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub pwd: Option<String>,
    #[serde(default)]
    pub offline_queued: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub scripts: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtrCommandResult {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cloud_request_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub sequence_id: Option<i64>,
    #[serde(default)]
    pub complete: Option<bool>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub base_command: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Request shape shared by read-only and active-responder commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RtrCommand {
    pub session_id: String,
    pub base_command: String,
    pub command_string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist: Option<bool>,
}

impl RtrCommand {
    pub fn new(
        session_id: impl Into<String>,
        base_command: impl Into<String>,
        command_string: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            base_command: base_command.into(),
            command_string: command_string.into(),
            persist: None,
        }
    }

    fn validate(&self) -> Result<(), FalconError> {
        if self.session_id.trim().is_empty() {
            return Err(FalconError::validation("session_id must not be empty"));
        }
        if self.base_command.trim().is_empty() {
            return Err(FalconError::validation("base_command must not be empty"));
        }
        Ok(())
    }
}

fn first<T>(resources: Vec<T>, what: &str) -> Result<T, FalconError> {
    resources
        .into_iter()
        .next()
        .ok_or_else(|| FalconError::Decode(format!("vendor returned no {}", what)))
}

impl FalconClient {
    /// Opens a session on `device_id`. `queue_offline` is passed through as-is.
    pub async fn init_rtr_session(
        &self,
        device_id: &str,
        queue_offline: bool,
    ) -> Result<RtrSession, FalconError> {
        if device_id.trim().is_empty() {
            return Err(FalconError::validation("device_id must not be empty"));
        }
        let envelope = self
            .send_json::<RtrSession>(
                Method::POST,
                SESSIONS,
                serde_json::json!({ "device_id": device_id, "queue_offline": queue_offline }),
            )
            .await?;
        first(resources(envelope), "session")
    }

    /// Read-only ("investigate") command.
    pub async fn execute_rtr_command(
        &self,
        command: &RtrCommand,
    ) -> Result<RtrCommandResult, FalconError> {
        self.run_command(COMMAND, command).await
    }

    /// Command that may change endpoint state.
    pub async fn execute_rtr_active_responder_command(
        &self,
        command: &RtrCommand,
    ) -> Result<RtrCommandResult, FalconError> {
        self.run_command(ACTIVE_RESPONDER_COMMAND, command).await
    }

    pub async fn get_rtr_command_status(
        &self,
        cloud_request_id: &str,
        sequence_id: u32,
    ) -> Result<RtrCommandResult, FalconError> {
        self.command_status(COMMAND, cloud_request_id, sequence_id)
            .await
    }

    pub async fn get_rtr_active_responder_command_status(
        &self,
        cloud_request_id: &str,
        sequence_id: u32,
    ) -> Result<RtrCommandResult, FalconError> {
        self.command_status(ACTIVE_RESPONDER_COMMAND, cloud_request_id, sequence_id)
            .await
    }

    pub async fn list_rtr_sessions(&self, ids: &[String]) -> Result<Vec<RtrSession>, FalconError> {
        self.entities_by_body(SESSIONS_GET, "ids", ids).await
    }

    pub async fn delete_rtr_session(&self, session_id: &str) -> Result<Ack, FalconError> {
        self.request::<Value>(
            Method::DELETE,
            &endpoint(SESSIONS, &[("session_id", session_id)]),
            Default::default(),
        )
        .await?;
        Ok(Ack::ok(format!("Deleted RTR session {}", session_id)))
    }

    async fn run_command(
        &self,
        path: &str,
        command: &RtrCommand,
    ) -> Result<RtrCommandResult, FalconError> {
        command.validate()?;
        let body = serde_json::to_value(command)
            .map_err(|err| FalconError::validation(err.to_string()))?;
        let envelope = self
            .send_json::<RtrCommandResult>(Method::POST, path, body)
            .await?;
        first(resources(envelope), "command result")
    }

    async fn command_status(
        &self,
        path: &str,
        cloud_request_id: &str,
        sequence_id: u32,
    ) -> Result<RtrCommandResult, FalconError> {
        if cloud_request_id.trim().is_empty() {
            return Err(FalconError::validation("cloud_request_id must not be empty"));
        }
        let sequence = sequence_id.to_string();
        let envelope = self
            .get_envelope::<RtrCommandResult>(&endpoint(
                path,
                &[("cloud_request_id", cloud_request_id), ("sequence_id", &sequence)],
            ))
            .await?;
        first(resources(envelope), "command status")
    }
}
