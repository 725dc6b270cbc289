use crate::errors::ToolError;
use crate::falcon::{ActionParameter, FalconClient};
use crate::managers::{ack_payload, page_payload, records_payload};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_action_error;
use serde_json::Value;

pub const ALERTS_ACTIONS: &[&str] = &["query", "get", "search", "update"];

#[derive(Clone)]
pub struct AlertsManager {
    logger: Logger,
    validation: Validation,
}

impl AlertsManager {
    pub fn new(logger: Logger, validation: Validation) -> Self {
        Self {
            logger: logger.child("alerts"),
            validation,
        }
    }

    pub async fn handle_action(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "query" => {
                let params = self.validation.query_params(&args)?;
                Ok(page_payload(client.query_alerts(&params).await?))
            }
            "get" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                records_payload("alerts", &client.get_alerts(&ids).await?, None)
            }
            "search" => {
                let params = self.validation.query_params(&args)?;
                let page = client.query_alerts(&params).await?;
                let alerts = client.get_alerts(&page.ids).await?;
                records_payload("alerts", &alerts, Some(page))
            }
            "update" => self.update(client, &args).await,
            _ => Err(unknown_action_error("falcon_alerts", action, ALERTS_ACTIONS)),
        }
    }

    /// `status` is shorthand for an `update_status` action parameter.
    async fn update(&self, client: &FalconClient, args: &Value) -> Result<Value, ToolError> {
        let ids = self.validation.ensure_id_list(args, "ids")?;
        let mut parameters = self
            .validation
            .action_parameters(args.get("action_parameters"))?;
        if let Some(status) = self
            .validation
            .ensure_optional_string(args.get("status"), "status", true)?
        {
            parameters.retain(|p| p.name != "update_status");
            parameters.push(ActionParameter::new("update_status", status));
        }
        if parameters.is_empty() {
            return Err(ToolError::invalid_params(
                "update requires status or action_parameters",
            ));
        }
        let ack = client.update_alerts(&ids, parameters).await?;
        self.logger.info(
            "alerts updated",
            Some(&serde_json::json!({ "alerts": ids.len() })),
        );
        Ok(ack_payload(ack))
    }
}

#[async_trait::async_trait]
impl ToolHandler for AlertsManager {
    async fn handle(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        self.handle_action(client, args).await
    }
}
