#![allow(dead_code)]

use falcon_mcp::falcon::{FalconClient, ManualClock, TenantCredentials};
use httpmock::prelude::*;
use httpmock::Mock;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub fn token_body(token: &str, expires_in: i64) -> String {
    format!(
        r#"{{"access_token":"{}","token_type":"bearer","expires_in":{}}}"#,
        token, expires_in
    )
}

pub fn mock_token<'a>(server: &'a MockServer, token: &str, expires_in: i64) -> Mock<'a> {
    let body = token_body(token, expires_in);
    server.mock(move |when, then| {
        when.method(POST).path("/oauth2/token");
        then.status(201)
            .header("content-type", "application/json")
            .body(body);
    })
}

pub fn credentials(server: &MockServer) -> TenantCredentials {
    TenantCredentials::new("tenant-id", "tenant-secret").with_base_url(server.base_url())
}

pub fn client(server: &MockServer) -> FalconClient {
    FalconClient::new(credentials(server)).expect("client must build")
}

pub fn client_with_clock(server: &MockServer, clock: Arc<ManualClock>) -> FalconClient {
    FalconClient::with_clock(credentials(server), clock).expect("client must build")
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
