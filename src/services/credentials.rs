use crate::constants::{env, headers};
use crate::errors::ToolError;
use crate::falcon::TenantCredentials;
use axum::http::HeaderMap;

/// Where a tool call's tenant credentials come from.
///
/// Resolution happens per call; nothing is cached between requests.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// `FALCON_CLIENT_ID` / `FALCON_CLIENT_SECRET` / `FALCON_BASE_URL`, read at call time.
    Environment,
    /// Already extracted from an inbound request; `None` when headers were missing.
    Request(Option<TenantCredentials>),
}

impl CredentialSource {
    pub fn resolve(&self) -> Result<TenantCredentials, ToolError> {
        match self {
            CredentialSource::Environment => from_env().ok_or_else(|| {
                ToolError::missing_credentials("Falcon API credentials are not configured")
                    .with_hint(format!(
                        "Set {} and {} before starting the server.",
                        env::CLIENT_ID,
                        env::CLIENT_SECRET
                    ))
            }),
            CredentialSource::Request(Some(credentials)) => Ok(credentials.clone()),
            CredentialSource::Request(None) => Err(ToolError::missing_credentials(
                "Falcon API credentials were not supplied with the request",
            )
            .with_hint("Send the X-CS-Client-Id and X-CS-Client-Secret headers.")),
        }
    }
}

pub fn from_env() -> Option<TenantCredentials> {
    let client_id = non_blank(std::env::var(env::CLIENT_ID).ok())?;
    let client_secret = non_blank(std::env::var(env::CLIENT_SECRET).ok())?;
    let mut credentials = TenantCredentials::new(client_id, client_secret);
    if let Some(base_url) = non_blank(std::env::var(env::BASE_URL).ok()) {
        credentials = credentials.with_base_url(base_url);
    }
    Some(credentials)
}

pub fn from_headers(map: &HeaderMap) -> Option<TenantCredentials> {
    let read = |name: &str| non_blank(map.get(name).and_then(|v| v.to_str().ok()).map(str::to_string));
    let client_id = read(headers::CLIENT_ID)?;
    let client_secret = read(headers::CLIENT_SECRET)?;
    let mut credentials = TenantCredentials::new(client_id, client_secret);
    if let Some(base_url) = read(headers::BASE_URL) {
        credentials = credentials.with_base_url(base_url);
    }
    Some(credentials)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn headers_require_id_and_secret() {
        let mut map = HeaderMap::new();
        map.insert("X-CS-Client-Id", HeaderValue::from_static("id-1"));
        assert!(from_headers(&map).is_none());

        map.insert("X-CS-Client-Secret", HeaderValue::from_static("s-1"));
        map.insert("X-CS-Base-Url", HeaderValue::from_static("eu-1"));
        let creds = from_headers(&map).unwrap();
        assert_eq!(creds.client_id(), "id-1");
        assert_eq!(creds.base_url(), Some("eu-1"));
    }

    #[test]
    fn blank_header_counts_as_missing() {
        let mut map = HeaderMap::new();
        map.insert("X-CS-Client-Id", HeaderValue::from_static("id-1"));
        map.insert("X-CS-Client-Secret", HeaderValue::from_static("  "));
        assert!(from_headers(&map).is_none());
    }

    #[test]
    fn missing_request_credentials_is_denied() {
        let err = CredentialSource::Request(None).resolve().unwrap_err();
        assert_eq!(err.code, "MISSING_CREDENTIALS");
        assert_eq!(err.kind, crate::errors::ToolErrorKind::Denied);
    }
}
