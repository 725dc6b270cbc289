use crate::errors::FalconError;
use crate::falcon::client::FalconClient;
use crate::falcon::query::{endpoint, endpoint_with_ids, QueryParams};
use crate::falcon::types::{plural, Ack, ActionParameter, Extra, IdPage};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

const QUERY_HOST_GROUPS: &str = "/devices/queries/host-groups/v1";
const HOST_GROUP_ENTITIES: &str = "/devices/entities/host-groups/v1";
const HOST_GROUP_ACTIONS: &str = "/devices/entities/host-group-actions/v1";

pub const GROUP_TYPES: &[&str] = &["static", "dynamic", "staticByID"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostGroup {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub group_type: Option<String>,
    #[serde(default)]
    pub assignment_rule: Option<String>,
    #[serde(default)]
    pub created_timestamp: Option<String>,
    #[serde(default)]
    pub modified_timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewHostGroup {
    pub name: String,
    pub group_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_rule: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostGroupUpdate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_rule: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAction {
    AddHosts,
    RemoveHosts,
}

impl GroupAction {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupAction::AddHosts => "add-hosts",
            GroupAction::RemoveHosts => "remove-hosts",
        }
    }
}

impl FromStr for GroupAction {
    type Err = FalconError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "add-hosts" | "add_hosts" => Ok(GroupAction::AddHosts),
            "remove-hosts" | "remove_hosts" => Ok(GroupAction::RemoveHosts),
            other => Err(FalconError::validation(format!(
                "Unknown host group action: {}",
                other
            ))),
        }
    }
}

/// FQL filter selecting the given devices, as the group action endpoint expects.
///
/// Ids carrying a quote or backslash would escape the FQL string literal and
/// are rejected.
fn device_filter(host_ids: &[String]) -> Result<String, FalconError> {
    if let Some(bad) = host_ids
        .iter()
        .find(|id| id.contains(|c: char| c == '\'' || c == '\\'))
    {
        return Err(FalconError::validation(format!(
            "Invalid host id '{}': quotes and backslashes are not allowed",
            bad
        )));
    }
    let quoted = host_ids
        .iter()
        .map(|id| format!("'{}'", id))
        .collect::<Vec<_>>()
        .join(",");
    Ok(format!("(device_id:[{}])", quoted))
}

impl FalconClient {
    pub async fn query_host_groups(&self, params: &QueryParams) -> Result<IdPage, FalconError> {
        self.query_ids(QUERY_HOST_GROUPS, params).await
    }

    pub async fn get_host_groups(&self, ids: &[String]) -> Result<Vec<HostGroup>, FalconError> {
        self.entities_by_query(HOST_GROUP_ENTITIES, ids).await
    }

    pub async fn create_host_group(&self, group: &NewHostGroup) -> Result<Ack, FalconError> {
        if group.name.trim().is_empty() {
            return Err(FalconError::validation("Host group name must not be empty"));
        }
        if !GROUP_TYPES.contains(&group.group_type.as_str()) {
            return Err(FalconError::validation(format!(
                "Invalid group type '{}'; expected one of {}",
                group.group_type,
                GROUP_TYPES.join(", ")
            )));
        }
        self.send_json::<Value>(
            Method::POST,
            HOST_GROUP_ENTITIES,
            serde_json::json!({ "resources": [group] }),
        )
        .await?;
        Ok(Ack::ok(format!("Created host group '{}'", group.name)))
    }

    pub async fn update_host_group(&self, update: &HostGroupUpdate) -> Result<Ack, FalconError> {
        self.send_json::<Value>(
            Method::PATCH,
            HOST_GROUP_ENTITIES,
            serde_json::json!({ "resources": [update] }),
        )
        .await?;
        Ok(Ack::ok(format!("Updated host group {}", update.id)))
    }

    /// Always issues the call, even for an empty id list.
    pub async fn delete_host_groups(&self, ids: &[String]) -> Result<Ack, FalconError> {
        self.request::<Value>(
            Method::DELETE,
            &endpoint_with_ids(HOST_GROUP_ENTITIES, "ids", ids),
            Default::default(),
        )
        .await?;
        Ok(Ack::ok(format!("Deleted {}", plural(ids.len(), "host group"))))
    }

    pub async fn perform_host_group_action(
        &self,
        action: GroupAction,
        group_id: &str,
        host_ids: &[String],
    ) -> Result<Ack, FalconError> {
        if host_ids.is_empty() {
            return Ok(Ack::nothing_to_do("hosts"));
        }
        if group_id.trim().is_empty() {
            return Err(FalconError::validation("group_id must not be empty"));
        }
        let parameters = vec![ActionParameter::new("filter", device_filter(host_ids)?)];
        self.send_json::<Value>(
            Method::POST,
            &endpoint(HOST_GROUP_ACTIONS, &[("action_name", action.as_str())]),
            serde_json::json!({ "ids": [group_id], "action_parameters": parameters }),
        )
        .await?;
        Ok(Ack::ok(format!(
            "Requested '{}' with {} for host group {}",
            action.as_str(),
            plural(host_ids.len(), "host"),
            group_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_filter_quotes_each_id() {
        let ids = vec!["a".to_string(), "b".to_string()];
        assert_eq!(device_filter(&ids).unwrap(), "(device_id:['a','b'])");
    }

    #[test]
    fn device_filter_rejects_quote_breakout() {
        let ids = vec!["a".to_string(), "x'],platform_name:['Linux".to_string()];
        assert!(matches!(device_filter(&ids), Err(FalconError::Validation(_))));
        let ids = vec!["a\\".to_string()];
        assert!(device_filter(&ids).is_err());
    }

    #[test]
    fn group_action_accepts_both_spellings() {
        assert_eq!("add-hosts".parse::<GroupAction>().unwrap(), GroupAction::AddHosts);
        assert_eq!(
            "remove_hosts".parse::<GroupAction>().unwrap(),
            GroupAction::RemoveHosts
        );
        assert!("move-hosts".parse::<GroupAction>().is_err());
    }
}
