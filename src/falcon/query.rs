use serde::Serialize;

/// Read-only description of a list query.
///
/// Offset families use `limit`/`offset`; IOC and vulnerability queries use the
/// `after` cursor. Mixing the two is not validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }

    pub fn has_filter(&self) -> bool {
        self.filter
            .as_deref()
            .map(|f| !f.trim().is_empty())
            .unwrap_or(false)
    }

    /// URL query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_default()
    }
}

/// `path?key=value&...`, percent-encoded. Keys may repeat (`ids=a&ids=b`).
pub(crate) fn endpoint(path: &str, pairs: &[(&str, &str)]) -> String {
    let query = serde_urlencoded::to_string(pairs).unwrap_or_default();
    join(path, &query)
}

pub(crate) fn endpoint_with_ids(path: &str, key: &str, ids: &[String]) -> String {
    let pairs: Vec<(&str, &str)> = ids.iter().map(|id| (key, id.as_str())).collect();
    endpoint(path, &pairs)
}

pub(crate) fn endpoint_with_params(path: &str, params: &QueryParams) -> String {
    join(path, &params.to_query_string())
}

fn join(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}
