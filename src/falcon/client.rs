use crate::constants::falcon::{DEFAULT_RETRY_AFTER_SECS, RETRY_AFTER_HEADER, USER_AGENT};
use crate::errors::FalconError;
use crate::falcon::clock::{Clock, SystemClock};
use crate::falcon::credentials::TenantCredentials;
use crate::falcon::query::{endpoint_with_ids, endpoint_with_params, QueryParams};
use crate::falcon::token::{AccessToken, TokenManager};
use crate::falcon::types::{Envelope, IdPage};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Extra inputs for one API round trip.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Merged over the default headers; on a name collision these win.
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn json(body: Value) -> Self {
        Self {
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Falcon API client bound to one tenant's credentials.
///
/// Built fresh per incoming request via [`create_client`]; never shared across
/// tenants. Holds at most one cached bearer token.
pub struct FalconClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenManager,
}

/// Builds a client bound to `credentials` for its whole lifetime.
pub fn create_client(credentials: TenantCredentials) -> Result<FalconClient, FalconError> {
    FalconClient::new(credentials)
}

impl FalconClient {
    pub fn new(credentials: TenantCredentials) -> Result<Self, FalconError> {
        Self::with_clock(credentials, Arc::new(SystemClock))
    }

    pub fn with_clock(
        credentials: TenantCredentials,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, FalconError> {
        let base_url = credentials.resolve_base_url()?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| FalconError::Transport(format!("failed to build HTTP client: {}", err)))?;
        let tokens = TokenManager::new(http.clone(), credentials, &base_url, clock);
        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Valid bearer token, exchanging credentials only when the cache is empty
    /// or within the expiry skew.
    pub async fn access_token(&self) -> Result<String, FalconError> {
        self.tokens.access_token().await
    }

    pub async fn cached_token(&self) -> Option<AccessToken> {
        self.tokens.cached().await
    }

    /// One authenticated round trip. `Ok(None)` means the vendor answered with
    /// no content (204 or an empty 2xx body).
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, FalconError> {
        let token = self.tokens.access_token().await?;
        let headers = build_headers(&token, &options.headers)?;

        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, endpoint))
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.body(body.to_string());
        }
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FalconError::RateLimit {
                retry_after: retry_after(response.headers()),
            });
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.tokens.invalidate(&token).await;
            let body = response.text().await.unwrap_or_default();
            return Err(FalconError::Authentication {
                status: Some(status.as_u16()),
                message: vendor_message(&body).unwrap_or_else(|| status_line(status)),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FalconError::Api {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &body),
            });
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| FalconError::Decode(err.to_string()))
    }

    pub(crate) async fn get_envelope<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Option<Envelope<T>>, FalconError> {
        self.request(Method::GET, endpoint, RequestOptions::default())
            .await
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Value,
    ) -> Result<Option<Envelope<T>>, FalconError> {
        self.request(method, endpoint, RequestOptions::json(body))
            .await
    }

    pub(crate) async fn query_ids(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<IdPage, FalconError> {
        let envelope = self
            .get_envelope::<String>(&endpoint_with_params(path, params))
            .await?;
        Ok(IdPage::from_envelope(envelope))
    }

    /// GET `path?ids=..&ids=..`; no call for an empty id list.
    pub(crate) async fn entities_by_query<T: DeserializeOwned>(
        &self,
        path: &str,
        ids: &[String],
    ) -> Result<Vec<T>, FalconError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let envelope = self
            .get_envelope::<T>(&endpoint_with_ids(path, "ids", ids))
            .await?;
        Ok(resources(envelope))
    }

    /// POST `{key: ids}`; no call for an empty id list.
    pub(crate) async fn entities_by_body<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        ids: &[String],
    ) -> Result<Vec<T>, FalconError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let envelope = self
            .send_json::<T>(Method::POST, path, serde_json::json!({ key: ids }))
            .await?;
        Ok(resources(envelope))
    }
}

impl fmt::Debug for FalconClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FalconClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

pub(crate) fn resources<T>(envelope: Option<Envelope<T>>) -> Vec<T> {
    envelope.map(|e| e.resources).unwrap_or_default()
}

fn build_headers(token: &str, extra: &[(String, String)]) -> Result<HeaderMap, FalconError> {
    let mut headers = HeaderMap::new();
    let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| FalconError::Decode("access token is not a valid header value".to_string()))?;
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| FalconError::validation(format!("Invalid header name: {}", name)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| FalconError::validation(format!("Invalid value for header {}", name)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn retry_after(headers: &HeaderMap) -> Duration {
    let secs = headers
        .get(RETRY_AFTER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
    Duration::from_secs(secs)
}

fn status_line(status: StatusCode) -> String {
    format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .trim_end()
    .to_string()
}

/// Message from the vendor error envelope: `errors[].message` joined with
/// `"; "`, else a top-level `message`.
pub(crate) fn vendor_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    let joined = parsed
        .get("errors")
        .and_then(|v| v.as_array())
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                .collect::<Vec<_>>()
                .join("; ")
        })
        .filter(|s| !s.is_empty());
    joined.or_else(|| {
        parsed
            .get("message")
            .and_then(|m| m.as_str())
            .map(|s| s.to_string())
    })
}

pub(crate) fn error_message(status: u16, body: &str) -> String {
    vendor_message(body).unwrap_or_else(|| format!("API error: {}", status))
}
