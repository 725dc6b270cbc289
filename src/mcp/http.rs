//! Streamable HTTP transport: one JSON-RPC message per `POST /mcp`.
//!
//! Tenant credentials travel with every request in the `X-CS-Client-Id`,
//! `X-CS-Client-Secret` and optional `X-CS-Base-Url` headers. Nothing is kept
//! between requests.

use crate::errors::ToolError;
use crate::mcp::server::McpServer;
use crate::services::credentials::{from_headers, CredentialSource};
use crate::services::logger::Logger;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;

pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mcp", post(handle_mcp))
        .with_state(server)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn handle_mcp(
    State(server): State<Arc<McpServer>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let credentials = CredentialSource::Request(from_headers(&headers));
    match server.handle_message(&body, &credentials).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Serves on an already-bound listener until the task is dropped.
pub async fn serve_with_listener(
    listener: TcpListener,
    server: Arc<McpServer>,
) -> Result<(), ToolError> {
    axum::serve(listener, router(server)).await?;
    Ok(())
}

pub async fn run_http(addr: &str) -> Result<(), ToolError> {
    let server = Arc::new(McpServer::new()?);
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    Logger::new("falcon-mcp:http").info(
        "http transport ready",
        Some(&serde_json::json!({ "listen": local.to_string() })),
    );
    serve_with_listener(listener, server).await
}
