use falcon_mcp::app::App;
use falcon_mcp::constants::env;
use falcon_mcp::services::credentials::CredentialSource;
use httpmock::prelude::*;
use serde_json::{json, Value};

mod common;
use common::{credentials, mock_token, ENV_LOCK};

async fn call(server: &MockServer, tool: &str, args: Value) -> Result<Value, String> {
    let app = App::initialize().expect("app must initialize");
    app.tool_executor
        .execute(tool, args, &CredentialSource::Request(Some(credentials(server))))
        .await
        .map_err(|err| err.render(tool, None))
}

#[tokio::test]
async fn environment_credentials_are_read_per_call() {
    let _guard = ENV_LOCK.lock().await;
    let server = MockServer::start();
    let token = server.mock(|when, then| {
        when.method(POST)
            .path("/oauth2/token")
            .body_includes("client_id=env-id");
        then.status(201)
            .header("content-type", "application/json")
            .body(common::token_body("tok-env", 1799));
    });
    server.mock(|when, then| {
        when.method(GET).path("/devices/queries/host-groups/v1");
        then.status(200).body(r#"{"resources":["g1"]}"#);
    });

    std::env::set_var(env::CLIENT_ID, "env-id");
    std::env::set_var(env::CLIENT_SECRET, "env-secret");
    std::env::set_var(env::BASE_URL, server.base_url());
    let app = App::initialize().unwrap();
    let result = app
        .tool_executor
        .execute(
            "falcon_host_groups",
            json!({"action": "query"}),
            &CredentialSource::Environment,
        )
        .await;
    std::env::remove_var(env::CLIENT_ID);
    std::env::remove_var(env::CLIENT_SECRET);
    std::env::remove_var(env::BASE_URL);

    let payload = result.unwrap();
    assert_eq!(payload["ids"], json!(["g1"]));
    token.assert_calls(1);
}

#[tokio::test]
async fn missing_environment_credentials_are_denied() {
    let _guard = ENV_LOCK.lock().await;
    std::env::remove_var(env::CLIENT_ID);
    std::env::remove_var(env::CLIENT_SECRET);
    let app = App::initialize().unwrap();
    let err = app
        .tool_executor
        .execute(
            "falcon_hosts",
            json!({"action": "query"}),
            &CredentialSource::Environment,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, "MISSING_CREDENTIALS");
}

#[tokio::test]
async fn hosts_search_combines_query_and_details() {
    let server = MockServer::start();
    mock_token(&server, "tok-a", 1799);
    server.mock(|when, then| {
        when.method(GET).path("/devices/queries/devices/v1");
        then.status(200)
            .body(r#"{"meta":{"pagination":{"offset":0,"limit":1,"total":5}},"resources":["d1"]}"#);
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/devices/entities/devices/v2")
            .json_body(json!({"ids": ["d1"]}));
        then.status(200)
            .body(r#"{"resources":[{"device_id":"d1","hostname":"web-1","os_version":"Ubuntu"}]}"#);
    });

    let payload = call(&server, "falcon_hosts", json!({"action": "search", "limit": 1}))
        .await
        .unwrap();
    assert_eq!(payload["success"], true);
    assert_eq!(payload["count"], 1);
    assert_eq!(payload["hosts"][0]["hostname"], "web-1");
    assert_eq!(payload["hosts"][0]["os_version"], "Ubuntu");
    assert_eq!(payload["pagination"]["total"], 5);
}

#[tokio::test]
async fn contain_with_no_ids_skips_the_vendor() {
    let server = MockServer::start();
    let token = mock_token(&server, "tok-a", 1799);
    let payload = call(&server, "falcon_hosts", json!({"action": "contain", "ids": []}))
        .await
        .unwrap();
    assert_eq!(payload["success"], true);
    assert_eq!(payload["message"], "No hosts specified; nothing to do");
    assert_eq!(token.calls(), 0);
}

#[tokio::test]
async fn alert_status_shorthand_becomes_action_parameter() {
    let server = MockServer::start();
    mock_token(&server, "tok-a", 1799);
    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path("/alerts/entities/alerts/v3")
            .json_body(json!({
                "composite_ids": ["c1"],
                "action_parameters": [{"name": "update_status", "value": "closed"}]
            }));
        then.status(200).body(r#"{"resources":[]}"#);
    });

    let payload = call(
        &server,
        "falcon_alerts",
        json!({"action": "update", "ids": ["c1"], "status": "closed"}),
    )
    .await
    .unwrap();
    mock.assert_calls(1);
    assert_eq!(payload["message"], "Updated status to 'closed' for 1 alert(s)");
}

#[tokio::test]
async fn ioc_create_posts_indicators() {
    let server = MockServer::start();
    mock_token(&server, "tok-a", 1799);
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/iocs/entities/indicators/v1")
            .body_includes(r#""type":"domain""#)
            .body_includes(r#""value":"evil.example""#);
        then.status(201).body(r#"{"resources":[{"id":"i1"}]}"#);
    });

    let payload = call(
        &server,
        "falcon_iocs",
        json!({
            "action": "create",
            "indicators": [{
                "type": "domain",
                "value": "evil.example",
                "action": "detect",
                "platforms": ["windows"]
            }]
        }),
    )
    .await
    .unwrap();
    mock.assert_calls(1);
    assert_eq!(payload["message"], "Created 1 IOC(s)");
}

#[tokio::test]
async fn vulnerability_query_without_filter_is_invalid_params() {
    let server = MockServer::start();
    let token = mock_token(&server, "tok-a", 1799);
    let err = call(&server, "falcon_vulnerabilities", json!({"action": "query"}))
        .await
        .unwrap_err();
    assert!(err.contains("code: INVALID_PARAMS"), "{}", err);
    assert!(err.contains("A filter is required"), "{}", err);
    assert_eq!(token.calls(), 0);
}

#[tokio::test]
async fn policy_enable_targets_family_endpoint() {
    let server = MockServer::start();
    mock_token(&server, "tok-a", 1799);
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/policy/entities/sensor-update-actions/v1")
            .query_param("action_name", "enable")
            .json_body(json!({"ids": ["p9"]}));
        then.status(200).body(r#"{"resources":[{"id":"p9"}]}"#);
    });

    let payload = call(
        &server,
        "falcon_policies",
        json!({"action": "enable", "policy_type": "sensor_update", "policy_id": "p9"}),
    )
    .await
    .unwrap();
    mock.assert_calls(1);
    assert_eq!(
        payload["message"],
        "Requested 'enable' for sensor-update policy p9"
    );
}

#[tokio::test]
async fn rtr_session_then_command() {
    let server = MockServer::start();
    mock_token(&server, "tok-a", 1799);
    server.mock(|when, then| {
        when.method(POST)
            .path("/real-time-response/entities/sessions/v1")
            .json_body(json!({"device_id": "d1", "queue_offline": false}));
        then.status(201)
            .body(r#"{"resources":[{"session_id":"s1","device_id":"d1","pwd":"C:\\"}]}"#);
    });
    let command = server.mock(|when, then| {
        when.method(POST)
            .path("/real-time-response/entities/command/v1")
            .json_body(json!({
                "session_id": "s1",
                "base_command": "ls",
                "command_string": "ls C:\\Windows"
            }));
        then.status(201)
            .body(r#"{"resources":[{"session_id":"s1","cloud_request_id":"r1","queued_command_offline":false}]}"#);
    });

    let session = call(
        &server,
        "falcon_rtr",
        json!({"action": "init_session", "device_id": "d1"}),
    )
    .await
    .unwrap();
    assert_eq!(session["session"]["session_id"], "s1");

    let result = call(
        &server,
        "falcon_rtr",
        json!({
            "action": "run_command",
            "session_id": "s1",
            "base_command": "ls",
            "command_string": "ls C:\\Windows"
        }),
    )
    .await
    .unwrap();
    command.assert_calls(1);
    assert_eq!(result["result"]["cloud_request_id"], "r1");
}

#[tokio::test]
async fn unknown_action_suggests_alternatives() {
    let server = MockServer::start();
    let err = call(&server, "falcon_host_groups", json!({"action": "add_host"}))
        .await
        .unwrap_err();
    assert!(err.contains("Unknown falcon_host_groups action: add_host"), "{}", err);
    assert!(err.contains("add_hosts"), "{}", err);
}
