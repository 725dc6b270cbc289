use crate::errors::FalconError;
use crate::falcon::client::FalconClient;
use crate::falcon::query::QueryParams;
use crate::falcon::types::{plural, Ack, ActionParameter, Extra, IdPage};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const QUERY_ALERTS: &str = "/alerts/queries/alerts/v2";
const ALERT_ENTITIES: &str = "/alerts/entities/alerts/v2";
const ALERT_UPDATE: &str = "/alerts/entities/alerts/v3";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub composite_id: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub severity: Option<i64>,
    #[serde(default)]
    pub severity_name: Option<String>,
    #[serde(default)]
    pub tactic: Option<String>,
    #[serde(default)]
    pub technique: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_timestamp: Option<String>,
    #[serde(default)]
    pub device: Option<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl FalconClient {
    pub async fn query_alerts(&self, params: &QueryParams) -> Result<IdPage, FalconError> {
        self.query_ids(QUERY_ALERTS, params).await
    }

    pub async fn get_alerts(&self, composite_ids: &[String]) -> Result<Vec<Alert>, FalconError> {
        self.entities_by_body(ALERT_ENTITIES, "composite_ids", composite_ids)
            .await
    }

    /// Always issues the call, even for an empty id list.
    pub async fn update_alerts(
        &self,
        composite_ids: &[String],
        action_parameters: Vec<ActionParameter>,
    ) -> Result<Ack, FalconError> {
        let status = action_parameters
            .iter()
            .find(|p| p.name == "update_status")
            .map(|p| p.value.clone());
        self.send_json::<Value>(
            Method::PATCH,
            ALERT_UPDATE,
            serde_json::json!({
                "composite_ids": composite_ids,
                "action_parameters": action_parameters,
            }),
        )
        .await?;

        let count = plural(composite_ids.len(), "alert");
        let message = match status {
            Some(status) => format!("Updated status to '{}' for {}", status, count),
            None => format!("Updated {}", count),
        };
        Ok(Ack::ok(message))
    }
}
