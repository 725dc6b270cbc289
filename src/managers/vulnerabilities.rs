use crate::errors::ToolError;
use crate::falcon::FalconClient;
use crate::managers::{page_payload, records_payload};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_action_error;
use serde_json::Value;

pub const VULNERABILITIES_ACTIONS: &[&str] = &["query", "get", "search"];

#[derive(Clone)]
pub struct VulnerabilitiesManager {
    logger: Logger,
    validation: Validation,
}

impl VulnerabilitiesManager {
    pub fn new(logger: Logger, validation: Validation) -> Self {
        Self {
            logger: logger.child("vulnerabilities"),
            validation,
        }
    }

    pub async fn handle_action(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "query" => {
                let params = self.validation.query_params(&args)?;
                Ok(page_payload(client.query_vulnerabilities(&params).await?))
            }
            "get" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                records_payload(
                    "vulnerabilities",
                    &client.get_vulnerabilities(&ids).await?,
                    None,
                )
            }
            "search" => {
                let params = self.validation.query_params(&args)?;
                let page = client.query_vulnerabilities(&params).await?;
                if page.pagination.as_ref().and_then(|p| p.after.as_ref()).is_some() {
                    self.logger.debug(
                        "more vulnerabilities available",
                        Some(&serde_json::json!({ "returned": page.ids.len() })),
                    );
                }
                let vulnerabilities = client.get_vulnerabilities(&page.ids).await?;
                records_payload("vulnerabilities", &vulnerabilities, Some(page))
            }
            _ => Err(unknown_action_error(
                "falcon_vulnerabilities",
                action,
                VULNERABILITIES_ACTIONS,
            )),
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for VulnerabilitiesManager {
    async fn handle(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        self.handle_action(client, args).await
    }
}
