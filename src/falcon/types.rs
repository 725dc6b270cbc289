use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Standard Falcon response envelope: `{meta, resources, errors}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub meta: Option<Meta>,
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub resources: Vec<T>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of a query operation: matching identifiers plus the vendor's
/// pagination block (carries the `after` cursor for cursor-paged families).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdPage {
    pub ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl IdPage {
    pub(crate) fn from_envelope(envelope: Option<Envelope<String>>) -> Self {
        match envelope {
            Some(envelope) => Self {
                ids: envelope.resources,
                pagination: envelope.meta.and_then(|m| m.pagination),
            },
            None => Self::default(),
        }
    }
}

/// Locally synthesized acknowledgement returned by every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub(crate) fn nothing_to_do(noun: &str) -> Self {
        Self::ok(format!("No {} specified; nothing to do", noun))
    }
}

/// `{name, value}` pair used by the vendor's action endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParameter {
    pub name: String,
    pub value: String,
}

impl ActionParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Vendor fields a record does not name explicitly.
pub type Extra = Map<String, Value>;

pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn plural(count: usize, noun: &str) -> String {
    format!("{} {}(s)", count, noun)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_tolerates_null_resources_and_errors() {
        let raw = r#"{"meta":{"query_time":0.1},"resources":null,"errors":null}"#;
        let envelope: Envelope<String> = serde_json::from_str(raw).unwrap();
        assert!(envelope.resources.is_empty());
        assert!(envelope.errors.is_empty());
    }

    #[test]
    fn id_page_carries_cursor() {
        let raw = r#"{"meta":{"pagination":{"limit":2,"total":5,"after":"cur-1"}},"resources":["a","b"]}"#;
        let envelope: Envelope<String> = serde_json::from_str(raw).unwrap();
        let page = IdPage::from_envelope(Some(envelope));
        assert_eq!(page.ids, vec!["a", "b"]);
        assert_eq!(
            page.pagination.and_then(|p| p.after).as_deref(),
            Some("cur-1")
        );
    }
}
