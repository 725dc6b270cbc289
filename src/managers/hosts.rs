use crate::errors::ToolError;
use crate::falcon::{FalconClient, HostAction};
use crate::managers::{ack_payload, page_payload, records_payload};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_action_error;
use serde_json::Value;

pub const HOSTS_ACTIONS: &[&str] = &[
    "query",
    "get",
    "search",
    "online_state",
    "contain",
    "lift_containment",
    "hide",
    "unhide",
];

#[derive(Clone)]
pub struct HostsManager {
    logger: Logger,
    validation: Validation,
}

impl HostsManager {
    pub fn new(logger: Logger, validation: Validation) -> Self {
        Self {
            logger: logger.child("hosts"),
            validation,
        }
    }

    pub async fn handle_action(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "query" => {
                let params = self.validation.query_params(&args)?;
                Ok(page_payload(client.query_devices(&params).await?))
            }
            "get" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                records_payload("hosts", &client.get_device_details(&ids).await?, None)
            }
            "search" => {
                let params = self.validation.query_params(&args)?;
                let page = client.query_devices(&params).await?;
                let hosts = client.get_device_details(&page.ids).await?;
                records_payload("hosts", &hosts, Some(page))
            }
            "online_state" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                records_payload("states", &client.get_online_state(&ids).await?, None)
            }
            "contain" => self.host_action(client, &args, HostAction::Contain).await,
            "lift_containment" => {
                self.host_action(client, &args, HostAction::LiftContainment)
                    .await
            }
            "hide" => self.host_action(client, &args, HostAction::HideHost).await,
            "unhide" => self.host_action(client, &args, HostAction::UnhideHost).await,
            _ => Err(unknown_action_error("falcon_hosts", action, HOSTS_ACTIONS)),
        }
    }

    async fn host_action(
        &self,
        client: &FalconClient,
        args: &Value,
        action: HostAction,
    ) -> Result<Value, ToolError> {
        let ids = self.validation.ensure_id_list(args, "ids")?;
        let ack = client.perform_host_action(action, &ids).await?;
        self.logger.info(
            "host action requested",
            Some(&serde_json::json!({ "action": action.as_str(), "hosts": ids.len() })),
        );
        Ok(ack_payload(ack))
    }
}

#[async_trait::async_trait]
impl ToolHandler for HostsManager {
    async fn handle(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        self.handle_action(client, args).await
    }
}
