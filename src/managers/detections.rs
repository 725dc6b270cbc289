use crate::errors::ToolError;
use crate::falcon::{DetectionUpdate, FalconClient};
use crate::managers::{ack_payload, page_payload, records_payload};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_action_error;
use serde_json::Value;

pub const DETECTIONS_ACTIONS: &[&str] = &["query", "get", "search", "update"];

#[derive(Clone)]
pub struct DetectionsManager {
    logger: Logger,
    validation: Validation,
}

impl DetectionsManager {
    pub fn new(logger: Logger, validation: Validation) -> Self {
        Self {
            logger: logger.child("detections"),
            validation,
        }
    }

    pub async fn handle_action(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "query" => {
                let params = self.validation.query_params(&args)?;
                Ok(page_payload(client.query_detections(&params).await?))
            }
            "get" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                records_payload(
                    "detections",
                    &client.get_detection_summaries(&ids).await?,
                    None,
                )
            }
            "search" => {
                let params = self.validation.query_params(&args)?;
                let page = client.query_detections(&params).await?;
                let detections = client.get_detection_summaries(&page.ids).await?;
                records_payload("detections", &detections, Some(page))
            }
            "update" => self.update(client, &args).await,
            _ => Err(unknown_action_error(
                "falcon_detections",
                action,
                DETECTIONS_ACTIONS,
            )),
        }
    }

    async fn update(&self, client: &FalconClient, args: &Value) -> Result<Value, ToolError> {
        let update = DetectionUpdate {
            ids: self.validation.ensure_id_list(args, "ids")?,
            status: self
                .validation
                .ensure_optional_string(args.get("status"), "status", true)?,
            assigned_to_uuid: self.validation.ensure_optional_string(
                args.get("assigned_to_uuid"),
                "assigned_to_uuid",
                true,
            )?,
            comment: self
                .validation
                .ensure_optional_string(args.get("comment"), "comment", false)?,
            show_in_ui: self
                .validation
                .ensure_optional_bool(args.get("show_in_ui"), "show_in_ui")?,
        };
        let ack = client.update_detections(&update).await?;
        self.logger.info(
            "detections updated",
            Some(&serde_json::json!({ "detections": update.ids.len(), "status": update.status })),
        );
        Ok(ack_payload(ack))
    }
}

#[async_trait::async_trait]
impl ToolHandler for DetectionsManager {
    async fn handle(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        self.handle_action(client, args).await
    }
}
