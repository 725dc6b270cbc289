use crate::errors::FalconError;
use crate::falcon::client::FalconClient;
use crate::falcon::query::QueryParams;
use crate::falcon::types::{plural, Ack, Extra, IdPage};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const QUERY_DETECTS: &str = "/detects/queries/detects/v1";
const DETECT_SUMMARIES: &str = "/detects/entities/summaries/GET/v1";
const DETECT_ENTITIES: &str = "/detects/entities/detects/v2";

pub const DETECTION_STATUSES: &[&str] = &[
    "new",
    "in_progress",
    "true_positive",
    "false_positive",
    "ignored",
    "closed",
    "reopened",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub detection_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub max_severity: Option<i64>,
    #[serde(default)]
    pub max_severity_displayname: Option<String>,
    #[serde(default)]
    pub first_behavior: Option<String>,
    #[serde(default)]
    pub last_behavior: Option<String>,
    #[serde(default)]
    pub device: Option<Value>,
    #[serde(default)]
    pub behaviors: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// PATCH body for detection updates. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionUpdate {
    pub ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_in_ui: Option<bool>,
}

impl FalconClient {
    pub async fn query_detections(&self, params: &QueryParams) -> Result<IdPage, FalconError> {
        self.query_ids(QUERY_DETECTS, params).await
    }

    pub async fn get_detection_summaries(
        &self,
        ids: &[String],
    ) -> Result<Vec<Detection>, FalconError> {
        self.entities_by_body(DETECT_SUMMARIES, "ids", ids).await
    }

    /// Always issues the call, even for an empty id list.
    pub async fn update_detections(&self, update: &DetectionUpdate) -> Result<Ack, FalconError> {
        if let Some(status) = update.status.as_deref() {
            if !DETECTION_STATUSES.contains(&status) {
                return Err(FalconError::validation(format!(
                    "Invalid detection status '{}'; expected one of {}",
                    status,
                    DETECTION_STATUSES.join(", ")
                )));
            }
        }
        let body = serde_json::to_value(update)
            .map_err(|err| FalconError::validation(err.to_string()))?;
        self.send_json::<Value>(Method::PATCH, DETECT_ENTITIES, body)
            .await?;

        let count = plural(update.ids.len(), "detection");
        let message = match update.status.as_deref() {
            Some(status) => format!("Updated status to '{}' for {}", status, count),
            None => format!("Updated {}", count),
        };
        Ok(Ack::ok(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_body_omits_unset_fields() {
        let update = DetectionUpdate {
            ids: vec!["ldt:1".to_string()],
            status: Some("in_progress".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"ids": ["ldt:1"], "status": "in_progress"})
        );
    }
}
