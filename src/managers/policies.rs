use crate::errors::ToolError;
use crate::falcon::{FalconClient, PolicyAction, PolicyKind};
use crate::managers::{ack_payload, page_payload, records_payload};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_action_error;
use serde_json::Value;

pub const POLICIES_ACTIONS: &[&str] = &[
    "query",
    "get",
    "search",
    "enable",
    "disable",
    "add_host_group",
    "remove_host_group",
];

#[derive(Clone)]
pub struct PoliciesManager {
    logger: Logger,
    validation: Validation,
}

impl PoliciesManager {
    pub fn new(logger: Logger, validation: Validation) -> Self {
        Self {
            logger: logger.child("policies"),
            validation,
        }
    }

    pub async fn handle_action(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        let action_name = action.and_then(|v| v.as_str()).unwrap_or("");
        if !POLICIES_ACTIONS.contains(&action_name) {
            return Err(unknown_action_error(
                "falcon_policies",
                action,
                POLICIES_ACTIONS,
            ));
        }
        let kind: PolicyKind = self.validation.parse_enum(&args, "policy_type")?;
        match action_name {
            "query" => {
                let params = self.validation.query_params(&args)?;
                Ok(page_payload(client.query_policies(kind, &params).await?))
            }
            "get" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                records_payload("policies", &client.get_policies(kind, &ids).await?, None)
            }
            "search" => {
                let params = self.validation.query_params(&args)?;
                let page = client.query_policies(kind, &params).await?;
                let policies = client.get_policies(kind, &page.ids).await?;
                records_payload("policies", &policies, Some(page))
            }
            other => {
                let policy_action: PolicyAction = other.parse().map_err(ToolError::from)?;
                self.policy_action(client, &args, kind, policy_action).await
            }
        }
    }

    async fn policy_action(
        &self,
        client: &FalconClient,
        args: &Value,
        kind: PolicyKind,
        action: PolicyAction,
    ) -> Result<Value, ToolError> {
        let policy_id = self.validation.required_string(args, "policy_id")?;
        let group_id = self
            .validation
            .ensure_optional_string(args.get("group_id"), "group_id", true)?;
        let ack = client
            .perform_policy_action(kind, action, &policy_id, group_id.as_deref())
            .await?;
        self.logger.info(
            "policy action requested",
            Some(&serde_json::json!({ "policy_type": kind.as_str(), "action": action.as_str() })),
        );
        Ok(ack_payload(ack))
    }
}

#[async_trait::async_trait]
impl ToolHandler for PoliciesManager {
    async fn handle(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        self.handle_action(client, args).await
    }
}
