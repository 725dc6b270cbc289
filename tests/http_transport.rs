use falcon_mcp::mcp::http::serve_with_listener;
use falcon_mcp::mcp::server::McpServer;
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

mod common;
use common::mock_token;

async fn spawn_worker() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Arc::new(McpServer::new().expect("app must initialize"));
    tokio::spawn(async move {
        let _ = serve_with_listener(listener, server).await;
    });
    format!("http://{}", addr)
}

fn tool_call(id: u64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}

fn result_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap_or("")
}

#[tokio::test]
async fn health_reports_ok() {
    let base = spawn_worker().await;
    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn tools_call_uses_credentials_from_headers() {
    let falcon = MockServer::start();
    let token = falcon.mock(|when, then| {
        when.method(POST)
            .path("/oauth2/token")
            .body_includes("client_id=header-id")
            .body_includes("client_secret=header-secret");
        then.status(201)
            .header("content-type", "application/json")
            .body(common::token_body("tok-h", 1799));
    });
    let devices = falcon.mock(|when, then| {
        when.method(GET)
            .path("/devices/queries/devices/v1")
            .query_param("filter", "platform_name:'Linux'")
            .header("authorization", "Bearer tok-h");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"resources":["d1","d2"]}"#);
    });

    let base = spawn_worker().await;
    let response: Value = reqwest::Client::new()
        .post(format!("{}/mcp", base))
        .header("X-CS-Client-Id", "header-id")
        .header("X-CS-Client-Secret", "header-secret")
        .header("X-CS-Base-Url", falcon.base_url())
        .json(&tool_call(
            1,
            "falcon_hosts",
            json!({"action": "query", "filter": "platform_name:'Linux'"}),
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(response["result"].get("isError").is_none(), "{}", response);
    let payload: Value = serde_json::from_str(result_text(&response)).unwrap();
    assert_eq!(payload["success"], true);
    assert_eq!(payload["count"], 2);
    assert_eq!(payload["ids"], json!(["d1", "d2"]));
    token.assert_calls(1);
    devices.assert_calls(1);
}

#[tokio::test]
async fn each_request_authenticates_independently() {
    let falcon = MockServer::start();
    let token = mock_token(&falcon, "tok-x", 1799);
    falcon.mock(|when, then| {
        when.method(GET).path("/devices/queries/devices/v1");
        then.status(200).body(r#"{"resources":[]}"#);
    });

    let base = spawn_worker().await;
    let http = reqwest::Client::new();
    for id in 0..2 {
        http.post(format!("{}/mcp", base))
            .header("X-CS-Client-Id", "tenant")
            .header("X-CS-Client-Secret", "secret")
            .header("X-CS-Base-Url", falcon.base_url())
            .json(&tool_call(id, "falcon_hosts", json!({"action": "query"})))
            .send()
            .await
            .unwrap();
    }
    token.assert_calls(2);
}

#[tokio::test]
async fn missing_headers_yield_tool_error() {
    let base = spawn_worker().await;
    let response: Value = reqwest::Client::new()
        .post(format!("{}/mcp", base))
        .json(&tool_call(2, "falcon_hosts", json!({"action": "query"})))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(response["result"]["isError"], true);
    assert!(result_text(&response).contains("MISSING_CREDENTIALS"));
}

#[tokio::test]
async fn vendor_failure_is_reported_in_result() {
    let falcon = MockServer::start();
    mock_token(&falcon, "tok-r", 1799);
    falcon.mock(|when, then| {
        when.method(GET).path("/spotlight/queries/vulnerabilities/v1");
        then.status(429).header("X-RateLimit-RetryAfter", "30");
    });

    let base = spawn_worker().await;
    let response: Value = reqwest::Client::new()
        .post(format!("{}/mcp", base))
        .header("X-CS-Client-Id", "tenant")
        .header("X-CS-Client-Secret", "secret")
        .header("X-CS-Base-Url", falcon.base_url())
        .json(&tool_call(
            3,
            "falcon_vulnerabilities",
            json!({"action": "query", "filter": "status:'open'"}),
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(response["result"]["isError"], true);
    let text = result_text(&response);
    assert!(text.contains("retryable: true"), "{}", text);
    assert!(text.contains("30"), "{}", text);
}

#[tokio::test]
async fn notification_is_accepted_without_body() {
    let base = spawn_worker().await;
    let response = reqwest::Client::new()
        .post(format!("{}/mcp", base))
        .json(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 202);
}
