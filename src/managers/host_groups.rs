use crate::errors::ToolError;
use crate::falcon::{FalconClient, GroupAction, HostGroupUpdate, NewHostGroup};
use crate::managers::{ack_payload, page_payload, records_payload};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_action_error;
use serde_json::Value;

pub const HOST_GROUPS_ACTIONS: &[&str] = &[
    "query",
    "get",
    "search",
    "create",
    "update",
    "delete",
    "add_hosts",
    "remove_hosts",
];

#[derive(Clone)]
pub struct HostGroupsManager {
    logger: Logger,
    validation: Validation,
}

impl HostGroupsManager {
    pub fn new(logger: Logger, validation: Validation) -> Self {
        Self {
            logger: logger.child("host_groups"),
            validation,
        }
    }

    pub async fn handle_action(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "query" => {
                let params = self.validation.query_params(&args)?;
                Ok(page_payload(client.query_host_groups(&params).await?))
            }
            "get" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                records_payload("host_groups", &client.get_host_groups(&ids).await?, None)
            }
            "search" => {
                let params = self.validation.query_params(&args)?;
                let page = client.query_host_groups(&params).await?;
                let groups = client.get_host_groups(&page.ids).await?;
                records_payload("host_groups", &groups, Some(page))
            }
            "create" => {
                let group: NewHostGroup = self.validation.record(args.get("group"), "group")?;
                let ack = client.create_host_group(&group).await?;
                self.logger.info(
                    "host group created",
                    Some(&serde_json::json!({ "group_type": group.group_type })),
                );
                Ok(ack_payload(ack))
            }
            "update" => {
                let update: HostGroupUpdate = self.validation.record(args.get("group"), "group")?;
                let ack = client.update_host_group(&update).await?;
                self.logger
                    .info("host group updated", Some(&serde_json::json!({ "id": update.id })));
                Ok(ack_payload(ack))
            }
            "delete" => {
                let ids = self.validation.ensure_id_list(&args, "ids")?;
                let ack = client.delete_host_groups(&ids).await?;
                self.logger.info(
                    "host groups deleted",
                    Some(&serde_json::json!({ "ids": ids.len() })),
                );
                Ok(ack_payload(ack))
            }
            "add_hosts" => self.membership(client, &args, GroupAction::AddHosts).await,
            "remove_hosts" => {
                self.membership(client, &args, GroupAction::RemoveHosts)
                    .await
            }
            _ => Err(unknown_action_error(
                "falcon_host_groups",
                action,
                HOST_GROUPS_ACTIONS,
            )),
        }
    }

    async fn membership(
        &self,
        client: &FalconClient,
        args: &Value,
        action: GroupAction,
    ) -> Result<Value, ToolError> {
        let group_id = self.validation.required_string(args, "group_id")?;
        let host_ids = self.validation.ensure_id_list(args, "host_ids")?;
        let ack = client
            .perform_host_group_action(action, &group_id, &host_ids)
            .await?;
        self.logger.info(
            "host group membership changed",
            Some(&serde_json::json!({ "action": action.as_str(), "hosts": host_ids.len() })),
        );
        Ok(ack_payload(ack))
    }
}

#[async_trait::async_trait]
impl ToolHandler for HostGroupsManager {
    async fn handle(&self, client: &FalconClient, args: Value) -> Result<Value, ToolError> {
        self.handle_action(client, args).await
    }
}
