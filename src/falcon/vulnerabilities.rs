use crate::errors::FalconError;
use crate::falcon::client::FalconClient;
use crate::falcon::query::QueryParams;
use crate::falcon::types::{Extra, IdPage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const QUERY_VULNERABILITIES: &str = "/spotlight/queries/vulnerabilities/v1";
const VULNERABILITY_ENTITIES: &str = "/spotlight/entities/vulnerabilities/v2";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    #[serde(default)]
    pub aid: Option<String>,
    #[serde(default)]
    pub cid: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_timestamp: Option<String>,
    #[serde(default)]
    pub updated_timestamp: Option<String>,
    #[serde(default)]
    pub cve: Option<Value>,
    #[serde(default)]
    pub host_info: Option<Value>,
    #[serde(default)]
    pub remediation: Option<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl FalconClient {
    /// The vendor requires a filter on this endpoint; a missing or blank one is
    /// rejected before any request is made.
    pub async fn query_vulnerabilities(&self, params: &QueryParams) -> Result<IdPage, FalconError> {
        if !params.has_filter() {
            return Err(FalconError::validation(
                "A filter is required for vulnerability queries",
            ));
        }
        self.query_ids(QUERY_VULNERABILITIES, params).await
    }

    pub async fn get_vulnerabilities(
        &self,
        ids: &[String],
    ) -> Result<Vec<Vulnerability>, FalconError> {
        self.entities_by_query(VULNERABILITY_ENTITIES, ids).await
    }
}
