use crate::constants::falcon::{TOKEN_EXPIRY_SKEW_MS, TOKEN_PATH};
use crate::errors::FalconError;
use crate::falcon::clock::Clock;
use crate::falcon::credentials::TenantCredentials;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Bearer token plus the epoch-millisecond instant it stops being valid.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at_ms: i64,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at_ms: i64) -> Self {
        Self {
            value: value.into(),
            expires_at_ms,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at_ms(&self) -> i64 {
        self.expires_at_ms
    }

    pub fn is_usable_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms.saturating_sub(TOKEN_EXPIRY_SKEW_MS)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
    expires_in: i64,
}

/// Owns the single cached token of one client.
///
/// The slot lock is held across the whole check-then-refresh sequence, so
/// concurrent callers on the same client never race two token exchanges.
pub(crate) struct TokenManager {
    http: reqwest::Client,
    credentials: TenantCredentials,
    token_url: String,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub(crate) fn new(
        http: reqwest::Client,
        credentials: TenantCredentials,
        base_url: &str,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http,
            credentials,
            token_url: format!("{}{}", base_url, TOKEN_PATH),
            clock,
            slot: Mutex::new(None),
        }
    }

    pub(crate) async fn access_token(&self) -> Result<String, FalconError> {
        let mut slot = self.slot.lock().await;
        if let Some(token) = slot.as_ref() {
            if token.is_usable_at(self.clock.now_ms()) {
                return Ok(token.value().to_string());
            }
        }
        let fresh = self.exchange().await?;
        let value = fresh.value().to_string();
        *slot = Some(fresh);
        Ok(value)
    }

    /// Drops the cached token if it is still the one that was rejected.
    ///
    /// A token refreshed by another caller in the meantime is kept.
    pub(crate) async fn invalidate(&self, rejected: &str) {
        let mut slot = self.slot.lock().await;
        if slot.as_ref().map(|t| t.value() == rejected).unwrap_or(false) {
            *slot = None;
        }
    }

    pub(crate) async fn cached(&self) -> Option<AccessToken> {
        self.slot.lock().await.clone()
    }

    async fn exchange(&self) -> Result<AccessToken, FalconError> {
        let form = [
            ("client_id", self.credentials.client_id()),
            ("client_secret", self.credentials.client_secret()),
        ];
        let response = self
            .http
            .post(&self.token_url)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FalconError::Authentication {
                status: Some(status.as_u16()),
                message: format!(
                    "token request failed: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
                .trim_end()
                .to_string(),
            });
        }

        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|err| FalconError::Decode(format!("token response: {}", err)))?;
        let lifetime_ms = payload.expires_in.max(0).saturating_mul(1000);
        let expires_at_ms = self.clock.now_ms().saturating_add(lifetime_ms);
        Ok(AccessToken::new(payload.access_token, expires_at_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::falcon::clock::ManualClock;
    use httpmock::prelude::*;

    fn token_json(token: &str, expires_in: i64) -> String {
        format!(
            r#"{{"access_token":"{}","token_type":"bearer","expires_in":{}}}"#,
            token, expires_in
        )
    }

    fn manager(server: &MockServer, clock: Arc<ManualClock>) -> TokenManager {
        TokenManager::new(
            reqwest::Client::new(),
            TenantCredentials::new("client-a", "secret-b"),
            &server.base_url(),
            clock,
        )
    }

    #[test]
    fn skew_boundary_is_exclusive() {
        let token = AccessToken::new("t", 300_000);
        assert!(token.is_usable_at(239_999));
        assert!(!token.is_usable_at(240_000));
        assert!(!token.is_usable_at(240_001));
    }

    #[test]
    fn debug_does_not_reveal_token() {
        let token = AccessToken::new("super-secret-token", 1);
        assert!(!format!("{:?}", token).contains("super-secret-token"));
    }

    #[tokio::test]
    async fn exchange_posts_form_credentials() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/oauth2/token")
                .header("content-type", "application/x-www-form-urlencoded")
                .body_includes("client_id=client-a")
                .body_includes("client_secret=secret-b");
            then.status(201)
                .header("content-type", "application/json")
                .body(token_json("tok-form", 1799));
        });

        let clock = Arc::new(ManualClock::new(1_000_000));
        let tokens = manager(&server, clock);
        assert_eq!(tokens.access_token().await.unwrap(), "tok-form");
        mock.assert_calls(1);

        let cached = tokens.cached().await.expect("token cached");
        assert_eq!(cached.expires_at_ms(), 1_000_000 + 1_799_000);
    }

    #[tokio::test]
    async fn oversized_lifetime_saturates() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/oauth2/token");
            then.status(201)
                .header("content-type", "application/json")
                .body(token_json("tok-long", 9_223_372_036_854_775));
        });

        let clock = Arc::new(ManualClock::new(1_000_000));
        let tokens = manager(&server, clock);
        assert_eq!(tokens.access_token().await.unwrap(), "tok-long");
        assert_eq!(tokens.cached().await.unwrap().expires_at_ms(), i64::MAX);

        assert_eq!(tokens.access_token().await.unwrap(), "tok-long");
        assert_eq!(mock.calls(), 1, "a saturated expiry stays usable");
    }

    #[tokio::test]
    async fn cache_hit_before_skew_refresh_after() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/oauth2/token");
            then.status(200)
                .header("content-type", "application/json")
                .body(token_json("tok-300", 300));
        });

        let clock = Arc::new(ManualClock::new(0));
        let tokens = manager(&server, clock.clone());
        tokens.access_token().await.unwrap();
        assert_eq!(mock.calls(), 1);

        clock.set_ms(239_000);
        tokens.access_token().await.unwrap();
        assert_eq!(mock.calls(), 1, "T+239s must reuse the cached token");

        clock.set_ms(241_000);
        tokens.access_token().await.unwrap();
        assert_eq!(mock.calls(), 2, "T+241s must refresh");
    }

    #[tokio::test]
    async fn failed_exchange_is_authentication_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/oauth2/token");
            then.status(403).body(r#"{"errors":[{"message":"access denied"}]}"#);
        });

        let tokens = manager(&server, Arc::new(ManualClock::new(0)));
        let err = tokens.access_token().await.unwrap_err();
        assert_eq!(
            err,
            FalconError::Authentication {
                status: Some(403),
                message: "token request failed: 403 Forbidden".to_string(),
            }
        );
        assert!(tokens.cached().await.is_none());

        tokens.access_token().await.unwrap_err();
        assert_eq!(mock.calls(), 2, "failures are never cached");
    }

    #[tokio::test]
    async fn invalidate_ignores_tokens_that_were_already_replaced() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/oauth2/token");
            then.status(200)
                .header("content-type", "application/json")
                .body(token_json("tok-current", 1800));
        });

        let tokens = manager(&server, Arc::new(ManualClock::new(0)));
        tokens.access_token().await.unwrap();

        tokens.invalidate("tok-stale").await;
        assert!(tokens.cached().await.is_some());

        tokens.invalidate("tok-current").await;
        assert!(tokens.cached().await.is_none());
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_exchange() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/oauth2/token");
            then.status(200)
                .header("content-type", "application/json")
                .delay(std::time::Duration::from_millis(50))
                .body(token_json("tok-shared", 1800));
        });

        let tokens = Arc::new(manager(&server, Arc::new(ManualClock::new(0))));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tokens = tokens.clone();
                tokio::spawn(async move { tokens.access_token().await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "tok-shared");
        }
        assert_eq!(mock.calls(), 1);
    }
}
