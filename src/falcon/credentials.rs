use crate::constants::falcon::{DEFAULT_BASE_URL, REGIONS};
use crate::errors::FalconError;
use std::fmt;
use url::Url;

/// OAuth2 client credentials of one tenant.
///
/// Immutable once built. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct TenantCredentials {
    client_id: String,
    client_secret: String,
    base_url: Option<String>,
}

impl TenantCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = if base_url.trim().is_empty() {
            None
        } else {
            Some(base_url)
        };
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Base URL the client talks to: the configured one (region alias or URL),
    /// or the primary US-1 endpoint.
    pub fn resolve_base_url(&self) -> Result<String, FalconError> {
        normalize_base_url(self.base_url.as_deref())
    }
}

impl fmt::Debug for TenantCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

pub fn normalize_base_url(raw: Option<&str>) -> Result<String, FalconError> {
    let raw = raw.unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(DEFAULT_BASE_URL.to_string());
    }
    let lowered = raw.to_lowercase();
    if let Some((_, url)) = REGIONS.iter().find(|(region, _)| *region == lowered) {
        return Ok((*url).to_string());
    }
    let mut url = Url::parse(raw)
        .map_err(|_| FalconError::validation(format!("Invalid Falcon base URL: {}", raw)))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(FalconError::validation(format!(
            "Falcon base URL must use http or https: {}",
            raw
        )));
    }
    url.set_fragment(None);
    url.set_query(None);
    let normalized = format!("{}{}", url.origin().ascii_serialization(), url.path());
    Ok(normalized.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_primary_region() {
        let creds = TenantCredentials::new("id", "secret");
        assert_eq!(creds.resolve_base_url().unwrap(), DEFAULT_BASE_URL);
    }

    #[test]
    fn accepts_region_aliases() {
        let creds = TenantCredentials::new("id", "secret").with_base_url("EU-1");
        assert_eq!(
            creds.resolve_base_url().unwrap(),
            "https://api.eu-1.crowdstrike.com"
        );
    }

    #[test]
    fn strips_trailing_slash_query_and_fragment() {
        let normalized = normalize_base_url(Some("http://127.0.0.1:8080/prefix/?x=1#frag")).unwrap();
        assert_eq!(normalized, "http://127.0.0.1:8080/prefix");
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(matches!(
            normalize_base_url(Some("ftp://example.com")),
            Err(FalconError::Validation(_))
        ));
        assert!(matches!(
            normalize_base_url(Some("not a url")),
            Err(FalconError::Validation(_))
        ));
    }

    #[test]
    fn debug_masks_secret() {
        let creds = TenantCredentials::new("id-1", "very-secret-value");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("id-1"));
        assert!(!rendered.contains("very-secret-value"));
    }
}
