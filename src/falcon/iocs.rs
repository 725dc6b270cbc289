use crate::errors::FalconError;
use crate::falcon::client::FalconClient;
use crate::falcon::query::{endpoint_with_ids, QueryParams};
use crate::falcon::types::{plural, Ack, Extra, IdPage};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const QUERY_INDICATORS: &str = "/iocs/queries/indicators/v1";
const INDICATOR_ENTITIES: &str = "/iocs/entities/indicators/v1";

pub const IOC_TYPES: &[&str] = &["sha256", "md5", "domain", "ipv4", "ipv6"];
pub const IOC_ACTIONS: &[&str] = &["no_action", "allow", "prevent_no_ui", "prevent", "detect"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ioc {
    pub id: String,
    #[serde(rename = "type", default)]
    pub ioc_type: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub platforms: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expiration: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewIoc {
    #[serde(rename = "type")]
    pub ioc_type: String,
    pub value: String,
    pub action: String,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_globally: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_groups: Option<Vec<String>>,
}

impl NewIoc {
    fn validate(&self) -> Result<(), FalconError> {
        if !IOC_TYPES.contains(&self.ioc_type.as_str()) {
            return Err(FalconError::validation(format!(
                "Invalid IOC type '{}'; expected one of {}",
                self.ioc_type,
                IOC_TYPES.join(", ")
            )));
        }
        if self.value.trim().is_empty() {
            return Err(FalconError::validation("IOC value must not be empty"));
        }
        if !IOC_ACTIONS.contains(&self.action.as_str()) {
            return Err(FalconError::validation(format!(
                "Invalid IOC action '{}'; expected one of {}",
                self.action,
                IOC_ACTIONS.join(", ")
            )));
        }
        Ok(())
    }
}

/// Partial update for an existing IOC, keyed by `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IocUpdate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl FalconClient {
    /// Cursor-paged: pass `after` from the previous page's pagination block.
    pub async fn query_iocs(&self, params: &QueryParams) -> Result<IdPage, FalconError> {
        self.query_ids(QUERY_INDICATORS, params).await
    }

    pub async fn get_iocs(&self, ids: &[String]) -> Result<Vec<Ioc>, FalconError> {
        self.entities_by_query(INDICATOR_ENTITIES, ids).await
    }

    pub async fn create_iocs(&self, indicators: &[NewIoc]) -> Result<Ack, FalconError> {
        if indicators.is_empty() {
            return Ok(Ack::nothing_to_do("indicators"));
        }
        for indicator in indicators {
            indicator.validate()?;
        }
        self.send_json::<Value>(
            Method::POST,
            INDICATOR_ENTITIES,
            serde_json::json!({ "indicators": indicators }),
        )
        .await?;
        Ok(Ack::ok(format!("Created {}", plural(indicators.len(), "IOC"))))
    }

    /// Always issues the call, even for an empty list.
    pub async fn update_iocs(&self, indicators: &[IocUpdate]) -> Result<Ack, FalconError> {
        self.send_json::<Value>(
            Method::PATCH,
            INDICATOR_ENTITIES,
            serde_json::json!({ "indicators": indicators }),
        )
        .await?;
        Ok(Ack::ok(format!("Updated {}", plural(indicators.len(), "IOC"))))
    }

    /// Always issues the call, even for an empty id list.
    pub async fn delete_iocs(&self, ids: &[String]) -> Result<Ack, FalconError> {
        self.request::<Value>(
            Method::DELETE,
            &endpoint_with_ids(INDICATOR_ENTITIES, "ids", ids),
            Default::default(),
        )
        .await?;
        Ok(Ack::ok(format!("Deleted {}", plural(ids.len(), "IOC"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewIoc {
        NewIoc {
            ioc_type: "domain".to_string(),
            value: "evil.example".to_string(),
            action: "detect".to_string(),
            platforms: vec!["windows".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn new_ioc_serializes_type_key() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["type"], "domain");
        assert!(value.get("severity").is_none());
    }

    #[test]
    fn new_ioc_rejects_unknown_type_and_action() {
        let mut bad = sample();
        bad.ioc_type = "url".to_string();
        assert!(matches!(bad.validate(), Err(FalconError::Validation(_))));

        let mut bad = sample();
        bad.action = "block".to_string();
        assert!(matches!(bad.validate(), Err(FalconError::Validation(_))));

        assert!(sample().validate().is_ok());
    }
}
