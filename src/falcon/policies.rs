use crate::errors::FalconError;
use crate::falcon::client::FalconClient;
use crate::falcon::query::{endpoint, QueryParams};
use crate::falcon::types::{Ack, ActionParameter, Extra, IdPage};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Prevention,
    SensorUpdate,
    DeviceControl,
}

impl PolicyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Prevention => "prevention",
            PolicyKind::SensorUpdate => "sensor-update",
            PolicyKind::DeviceControl => "device-control",
        }
    }

    fn entities_version(self) -> u8 {
        match self {
            PolicyKind::SensorUpdate => 2,
            PolicyKind::Prevention | PolicyKind::DeviceControl => 1,
        }
    }

    fn query_path(self) -> String {
        format!("/policy/queries/{}/v1", self.as_str())
    }

    fn entities_path(self) -> String {
        format!(
            "/policy/entities/{}/v{}",
            self.as_str(),
            self.entities_version()
        )
    }

    fn actions_path(self) -> String {
        format!("/policy/entities/{}-actions/v1", self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = FalconError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().replace('_', "-").as_str() {
            "prevention" => Ok(PolicyKind::Prevention),
            "sensor-update" => Ok(PolicyKind::SensorUpdate),
            "device-control" => Ok(PolicyKind::DeviceControl),
            other => Err(FalconError::validation(format!(
                "Unknown policy kind: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    Enable,
    Disable,
    AddHostGroup,
    RemoveHostGroup,
}

impl PolicyAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyAction::Enable => "enable",
            PolicyAction::Disable => "disable",
            PolicyAction::AddHostGroup => "add-host-group",
            PolicyAction::RemoveHostGroup => "remove-host-group",
        }
    }

    fn needs_group(self) -> bool {
        matches!(self, PolicyAction::AddHostGroup | PolicyAction::RemoveHostGroup)
    }
}

impl FromStr for PolicyAction {
    type Err = FalconError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().replace('_', "-").as_str() {
            "enable" => Ok(PolicyAction::Enable),
            "disable" => Ok(PolicyAction::Disable),
            "add-host-group" => Ok(PolicyAction::AddHostGroup),
            "remove-host-group" => Ok(PolicyAction::RemoveHostGroup),
            other => Err(FalconError::validation(format!(
                "Unknown policy action: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub platform_name: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub groups: Option<Vec<Value>>,
    #[serde(default)]
    pub settings: Option<Value>,
    #[serde(default)]
    pub modified_timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl FalconClient {
    pub async fn query_policies(
        &self,
        kind: PolicyKind,
        params: &QueryParams,
    ) -> Result<IdPage, FalconError> {
        self.query_ids(&kind.query_path(), params).await
    }

    pub async fn get_policies(
        &self,
        kind: PolicyKind,
        ids: &[String],
    ) -> Result<Vec<Policy>, FalconError> {
        self.entities_by_query(&kind.entities_path(), ids).await
    }

    pub async fn perform_policy_action(
        &self,
        kind: PolicyKind,
        action: PolicyAction,
        policy_id: &str,
        group_id: Option<&str>,
    ) -> Result<Ack, FalconError> {
        if policy_id.trim().is_empty() {
            return Err(FalconError::validation("policy_id must not be empty"));
        }
        let mut body = serde_json::json!({ "ids": [policy_id] });
        if action.needs_group() {
            let group_id = group_id
                .filter(|g| !g.trim().is_empty())
                .ok_or_else(|| {
                    FalconError::validation(format!("group_id is required for '{}'", action.as_str()))
                })?;
            body["action_parameters"] =
                serde_json::json!([ActionParameter::new("group_id", group_id)]);
        }
        self.send_json::<Value>(
            Method::POST,
            &endpoint(&kind.actions_path(), &[("action_name", action.as_str())]),
            body,
        )
        .await?;
        Ok(Ack::ok(format!(
            "Requested '{}' for {} policy {}",
            action.as_str(),
            kind.as_str(),
            policy_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_vendor_versions() {
        assert_eq!(
            PolicyKind::Prevention.entities_path(),
            "/policy/entities/prevention/v1"
        );
        assert_eq!(
            PolicyKind::SensorUpdate.entities_path(),
            "/policy/entities/sensor-update/v2"
        );
        assert_eq!(
            PolicyKind::DeviceControl.actions_path(),
            "/policy/entities/device-control-actions/v1"
        );
        assert_eq!(
            PolicyKind::SensorUpdate.query_path(),
            "/policy/queries/sensor-update/v1"
        );
    }

    #[test]
    fn kind_and_action_accept_underscores() {
        assert_eq!(
            "sensor_update".parse::<PolicyKind>().unwrap(),
            PolicyKind::SensorUpdate
        );
        assert_eq!(
            "add_host_group".parse::<PolicyAction>().unwrap(),
            PolicyAction::AddHostGroup
        );
        assert!("firewall".parse::<PolicyKind>().is_err());
    }
}
