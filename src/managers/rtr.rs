use crate::errors::ToolError;
use crate::falcon::{FalconClient, RtrCommand};
use crate::managers::{ack_payload, record_payload, records_payload};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_action_error;
use serde_json::Value;

pub const RTR_ACTIONS: &[&str] = &[
    "init_session",
    "run_command",
    "run_active_responder_command",
    "command_status",
    "active_responder_command_status",
    "list_sessions",
    "delete_session",
];

#[derive(Clone)]
pub struct RtrManager {
    logger: Logger,
    validation: Validation,
}

impl RtrManager {
    pub fn new(logger: Logger, validation: Validation) -> Self {
        Self {
            logger: logger.child("rtr"),
            validation,
        }
    }

    pub async fn handle_action(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "init_session" => {
                let device_id = self.validation.required_string(&args, "device_id")?;
                let queue_offline = self
                    .validation
                    .ensure_optional_bool(args.get("queue_offline"), "queue_offline")?
                    .unwrap_or(false);
                let session = client.init_rtr_session(&device_id, queue_offline).await?;
                self.logger.info(
                    "rtr session opened",
                    Some(&serde_json::json!({ "session_id": session.session_id })),
                );
                record_payload("session", &session)
            }
            "run_command" => {
                let command = self.command(&args)?;
                self.audit_command("rtr command", &command);
                record_payload("result", &client.execute_rtr_command(&command).await?)
            }
            "run_active_responder_command" => {
                let command = self.command(&args)?;
                self.audit_command("rtr active responder command", &command);
                record_payload(
                    "result",
                    &client.execute_rtr_active_responder_command(&command).await?,
                )
            }
            "command_status" => {
                let (request_id, sequence) = self.status_args(&args)?;
                record_payload(
                    "result",
                    &client.get_rtr_command_status(&request_id, sequence).await?,
                )
            }
            "active_responder_command_status" => {
                let (request_id, sequence) = self.status_args(&args)?;
                record_payload(
                    "result",
                    &client
                        .get_rtr_active_responder_command_status(&request_id, sequence)
                        .await?,
                )
            }
            "list_sessions" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                records_payload("sessions", &client.list_rtr_sessions(&ids).await?, None)
            }
            "delete_session" => {
                let session_id = self.validation.required_string(&args, "session_id")?;
                let ack = client.delete_rtr_session(&session_id).await?;
                self.logger.info(
                    "rtr session closed",
                    Some(&serde_json::json!({ "session_id": session_id })),
                );
                Ok(ack_payload(ack))
            }
            _ => Err(unknown_action_error("falcon_rtr", action, RTR_ACTIONS)),
        }
    }

    fn command(&self, args: &Value) -> Result<RtrCommand, ToolError> {
        let base_command = self.validation.required_string(args, "base_command")?;
        let command_string = self
            .validation
            .ensure_optional_string(args.get("command_string"), "command_string", false)?
            .unwrap_or_else(|| base_command.clone());
        let mut command = RtrCommand::new(
            self.validation.required_string(args, "session_id")?,
            base_command,
            command_string,
        );
        command.persist = self
            .validation
            .ensure_optional_bool(args.get("persist"), "persist")?;
        Ok(command)
    }

    fn status_args(&self, args: &Value) -> Result<(String, u32), ToolError> {
        let request_id = self.validation.required_string(args, "cloud_request_id")?;
        let sequence = self
            .validation
            .ensure_optional_u32(args.get("sequence_id"), "sequence_id")?
            .unwrap_or(0);
        Ok((request_id, sequence))
    }

    fn audit_command(&self, message: &str, command: &RtrCommand) {
        self.logger.info(
            message,
            Some(&serde_json::json!({
                "session_id": command.session_id,
                "base_command": command.base_command,
            })),
        );
    }
}

#[async_trait::async_trait]
impl ToolHandler for RtrManager {
    async fn handle(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        self.handle_action(client, args).await
    }
}
