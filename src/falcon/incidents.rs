use crate::errors::FalconError;
use crate::falcon::client::{resources, FalconClient};
use crate::falcon::query::{endpoint_with_params, QueryParams};
use crate::falcon::types::{plural, Ack, ActionParameter, Extra, IdPage};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

const QUERY_INCIDENTS: &str = "/incidents/queries/incidents/v1";
const INCIDENT_ENTITIES: &str = "/incidents/entities/incidents/GET/v1";
const QUERY_BEHAVIORS: &str = "/incidents/queries/behaviors/v1";
const BEHAVIOR_ENTITIES: &str = "/incidents/entities/behaviors/GET/v1";
const INCIDENT_ACTIONS: &str = "/incidents/entities/incident-actions/v1";
const CROWDSCORES: &str = "/incidents/combined/crowdscores/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub incident_id: String,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub fine_score: Option<i64>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub tactics: Option<Vec<String>>,
    #[serde(default)]
    pub techniques: Option<Vec<String>>,
    #[serde(default)]
    pub hosts: Option<Vec<Value>>,
    #[serde(default)]
    pub assigned_to_name: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Behavior {
    pub behavior_id: String,
    #[serde(default)]
    pub incident_id: Option<String>,
    #[serde(default)]
    pub aid: Option<String>,
    #[serde(default)]
    pub tactic: Option<String>,
    #[serde(default)]
    pub technique: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub cmdline: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrowdScore {
    pub id: String,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub adjusted_score: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Incident workflow states, encoded numerically by the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentStatus {
    New,
    Reopened,
    InProgress,
    Closed,
}

impl IncidentStatus {
    pub fn code(self) -> u16 {
        match self {
            IncidentStatus::New => 20,
            IncidentStatus::Reopened => 25,
            IncidentStatus::InProgress => 30,
            IncidentStatus::Closed => 40,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IncidentStatus::New => "new",
            IncidentStatus::Reopened => "reopened",
            IncidentStatus::InProgress => "in_progress",
            IncidentStatus::Closed => "closed",
        }
    }
}

impl FromStr for IncidentStatus {
    type Err = FalconError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "new" | "20" => Ok(IncidentStatus::New),
            "reopened" | "25" => Ok(IncidentStatus::Reopened),
            "in_progress" | "30" => Ok(IncidentStatus::InProgress),
            "closed" | "40" => Ok(IncidentStatus::Closed),
            other => Err(FalconError::validation(format!(
                "Unknown incident status: {}",
                other
            ))),
        }
    }
}

impl FalconClient {
    pub async fn query_incidents(&self, params: &QueryParams) -> Result<IdPage, FalconError> {
        self.query_ids(QUERY_INCIDENTS, params).await
    }

    pub async fn get_incidents(&self, ids: &[String]) -> Result<Vec<Incident>, FalconError> {
        self.entities_by_body(INCIDENT_ENTITIES, "ids", ids).await
    }

    pub async fn query_behaviors(&self, params: &QueryParams) -> Result<IdPage, FalconError> {
        self.query_ids(QUERY_BEHAVIORS, params).await
    }

    pub async fn get_behaviors(&self, ids: &[String]) -> Result<Vec<Behavior>, FalconError> {
        self.entities_by_body(BEHAVIOR_ENTITIES, "ids", ids).await
    }

    pub async fn get_crowdscores(
        &self,
        params: &QueryParams,
    ) -> Result<Vec<CrowdScore>, FalconError> {
        let envelope = self
            .get_envelope::<CrowdScore>(&endpoint_with_params(CROWDSCORES, params))
            .await?;
        Ok(resources(envelope))
    }

    pub async fn perform_incident_action(
        &self,
        ids: &[String],
        action_parameters: Vec<ActionParameter>,
    ) -> Result<Ack, FalconError> {
        if ids.is_empty() {
            return Ok(Ack::nothing_to_do("incidents"));
        }
        if action_parameters.is_empty() {
            return Err(FalconError::validation(
                "At least one incident action parameter is required",
            ));
        }
        let count = action_parameters.len();
        self.send_json::<Value>(
            Method::POST,
            INCIDENT_ACTIONS,
            serde_json::json!({ "ids": ids, "action_parameters": action_parameters }),
        )
        .await?;
        Ok(Ack::ok(format!(
            "Applied {} to {}",
            plural(count, "action parameter"),
            plural(ids.len(), "incident")
        )))
    }

    /// Status updates are sent even for an empty id list; the vendor decides.
    pub async fn update_incident_status(
        &self,
        ids: &[String],
        status: IncidentStatus,
    ) -> Result<Ack, FalconError> {
        let parameters = vec![ActionParameter::new(
            "update_status",
            status.code().to_string(),
        )];
        self.send_json::<Value>(
            Method::POST,
            INCIDENT_ACTIONS,
            serde_json::json!({ "ids": ids, "action_parameters": parameters }),
        )
        .await?;
        Ok(Ack::ok(format!(
            "Updated status to '{}' for {}",
            status.label(),
            plural(ids.len(), "incident")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_status_accepts_labels_and_codes() {
        assert_eq!(
            "in_progress".parse::<IncidentStatus>().unwrap(),
            IncidentStatus::InProgress
        );
        assert_eq!("40".parse::<IncidentStatus>().unwrap(), IncidentStatus::Closed);
        assert!("resolved".parse::<IncidentStatus>().is_err());
    }
}
