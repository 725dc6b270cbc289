use crate::errors::FalconError;
use crate::falcon::client::FalconClient;
use crate::falcon::query::{endpoint, QueryParams};
use crate::falcon::types::{plural, Ack, Extra, IdPage};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const QUERY_DEVICES: &str = "/devices/queries/devices/v1";
const DEVICE_ENTITIES: &str = "/devices/entities/devices/v2";
const DEVICE_ACTIONS: &str = "/devices/entities/devices-actions/v2";
const ONLINE_STATE: &str = "/devices/entities/online-state/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub device_id: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub platform_name: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub local_ip: Option<String>,
    #[serde(default)]
    pub external_ip: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub agent_version: Option<String>,
    #[serde(default)]
    pub first_seen: Option<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineState {
    pub id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Contain,
    LiftContainment,
    HideHost,
    UnhideHost,
}

impl HostAction {
    pub fn as_str(self) -> &'static str {
        match self {
            HostAction::Contain => "contain",
            HostAction::LiftContainment => "lift_containment",
            HostAction::HideHost => "hide_host",
            HostAction::UnhideHost => "unhide_host",
        }
    }
}

impl FromStr for HostAction {
    type Err = FalconError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "contain" => Ok(HostAction::Contain),
            "lift_containment" => Ok(HostAction::LiftContainment),
            "hide_host" => Ok(HostAction::HideHost),
            "unhide_host" => Ok(HostAction::UnhideHost),
            other => Err(FalconError::validation(format!(
                "Unknown host action: {}",
                other
            ))),
        }
    }
}

impl FalconClient {
    pub async fn query_devices(&self, params: &QueryParams) -> Result<IdPage, FalconError> {
        self.query_ids(QUERY_DEVICES, params).await
    }

    pub async fn get_device_details(&self, ids: &[String]) -> Result<Vec<Host>, FalconError> {
        self.entities_by_body(DEVICE_ENTITIES, "ids", ids).await
    }

    pub async fn get_online_state(&self, ids: &[String]) -> Result<Vec<OnlineState>, FalconError> {
        self.entities_by_query(ONLINE_STATE, ids).await
    }

    pub async fn perform_host_action(
        &self,
        action: HostAction,
        ids: &[String],
    ) -> Result<Ack, FalconError> {
        if ids.is_empty() {
            return Ok(Ack::nothing_to_do("hosts"));
        }
        self.send_json::<serde_json::Value>(
            Method::POST,
            &endpoint(DEVICE_ACTIONS, &[("action_name", action.as_str())]),
            serde_json::json!({ "ids": ids }),
        )
        .await?;
        Ok(Ack::ok(format!(
            "Requested '{}' for {}",
            action.as_str(),
            plural(ids.len(), "host")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_keeps_unknown_fields() {
        let raw = r#"{"device_id":"d1","hostname":"web-1","tags":["prod"],"cid":"c1"}"#;
        let host: Host = serde_json::from_str(raw).unwrap();
        assert_eq!(host.hostname.as_deref(), Some("web-1"));
        assert_eq!(host.extra.get("cid"), Some(&serde_json::json!("c1")));
    }

    #[test]
    fn host_action_round_trips_vendor_names() {
        for action in [
            HostAction::Contain,
            HostAction::LiftContainment,
            HostAction::HideHost,
            HostAction::UnhideHost,
        ] {
            assert_eq!(action.as_str().parse::<HostAction>().unwrap(), action);
        }
        assert!("isolate".parse::<HostAction>().is_err());
    }
}
