use crate::errors::ToolError;
use crate::falcon::{FalconClient, IncidentStatus};
use crate::managers::{ack_payload, page_payload, records_payload};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_action_error;
use serde_json::Value;

pub const INCIDENTS_ACTIONS: &[&str] = &[
    "query",
    "get",
    "search",
    "query_behaviors",
    "get_behaviors",
    "crowdscores",
    "update_status",
    "perform_action",
];

#[derive(Clone)]
pub struct IncidentsManager {
    logger: Logger,
    validation: Validation,
}

impl IncidentsManager {
    pub fn new(logger: Logger, validation: Validation) -> Self {
        Self {
            logger: logger.child("incidents"),
            validation,
        }
    }

    pub async fn handle_action(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "query" => {
                let params = self.validation.query_params(&args)?;
                Ok(page_payload(client.query_incidents(&params).await?))
            }
            "get" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                records_payload("incidents", &client.get_incidents(&ids).await?, None)
            }
            "search" => {
                let params = self.validation.query_params(&args)?;
                let page = client.query_incidents(&params).await?;
                let incidents = client.get_incidents(&page.ids).await?;
                records_payload("incidents", &incidents, Some(page))
            }
            "query_behaviors" => {
                let params = self.validation.query_params(&args)?;
                Ok(page_payload(client.query_behaviors(&params).await?))
            }
            "get_behaviors" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                records_payload("behaviors", &client.get_behaviors(&ids).await?, None)
            }
            "crowdscores" => {
                let params = self.validation.query_params(&args)?;
                records_payload("crowdscores", &client.get_crowdscores(&params).await?, None)
            }
            "update_status" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                let status: IncidentStatus = self.validation.parse_enum(&args, "status")?;
                let ack = client.update_incident_status(&ids, status).await?;
                self.logger.info(
                    "incident status updated",
                    Some(&serde_json::json!({ "incidents": ids.len(), "status": status.label() })),
                );
                Ok(ack_payload(ack))
            }
            "perform_action" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                let parameters = self
                    .validation
                    .action_parameters(args.get("action_parameters"))?;
                let ack = client.perform_incident_action(&ids, parameters).await?;
                self.logger.info(
                    "incident action performed",
                    Some(&serde_json::json!({ "incidents": ids.len() })),
                );
                Ok(ack_payload(ack))
            }
            _ => Err(unknown_action_error(
                "falcon_incidents",
                action,
                INCIDENTS_ACTIONS,
            )),
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for IncidentsManager {
    async fn handle(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        self.handle_action(client, args).await
    }
}
