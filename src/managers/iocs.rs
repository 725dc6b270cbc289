use crate::errors::ToolError;
use crate::falcon::{FalconClient, IocUpdate, NewIoc};
use crate::managers::{ack_payload, page_payload, records_payload};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_action_error;
use serde_json::Value;

pub const IOCS_ACTIONS: &[&str] = &["query", "get", "search", "create", "update", "delete"];

#[derive(Clone)]
pub struct IocsManager {
    logger: Logger,
    validation: Validation,
}

impl IocsManager {
    pub fn new(logger: Logger, validation: Validation) -> Self {
        Self {
            logger: logger.child("iocs"),
            validation,
        }
    }

    pub async fn handle_action(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "query" => {
                let params = self.validation.query_params(&args)?;
                Ok(page_payload(client.query_iocs(&params).await?))
            }
            "get" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                records_payload("iocs", &client.get_iocs(&ids).await?, None)
            }
            "search" => {
                let params = self.validation.query_params(&args)?;
                let page = client.query_iocs(&params).await?;
                let iocs = client.get_iocs(&page.ids).await?;
                records_payload("iocs", &iocs, Some(page))
            }
            "create" => {
                let indicators: Vec<NewIoc> =
                    self.validation.records(args.get("indicators"), "indicators")?;
                let ack = client.create_iocs(&indicators).await?;
                self.logger.info(
                    "iocs created",
                    Some(&serde_json::json!({ "indicators": indicators.len() })),
                );
                Ok(ack_payload(ack))
            }
            "update" => {
                let indicators: Vec<IocUpdate> =
                    self.validation.records(args.get("indicators"), "indicators")?;
                let ack = client.update_iocs(&indicators).await?;
                self.logger.info(
                    "iocs updated",
                    Some(&serde_json::json!({ "indicators": indicators.len() })),
                );
                Ok(ack_payload(ack))
            }
            "delete" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                let ack = client.delete_iocs(&ids).await?;
                self.logger
                    .info("iocs deleted", Some(&serde_json::json!({ "ids": ids.len() })));
                Ok(ack_payload(ack))
            }
            _ => Err(unknown_action_error("falcon_iocs", action, IOCS_ACTIONS)),
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for IocsManager {
    async fn handle(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        self.handle_action(client, args).await
    }
}
