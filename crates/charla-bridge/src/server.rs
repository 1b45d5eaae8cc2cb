// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.
//!
//! Chatwoot delivers webhooks at-least-once and unordered, and retries on
//! non-2xx. The handler therefore always answers 200 with a short ack,
//! logging undecodable or failing payloads instead of surfacing them.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tracing::warn;

use charla_core::error::CharlaError;

use crate::event::WebhookPayload;
use crate::orchestrator::Bridge;
use crate::router;

/// Webhook server bind configuration (mirrors `ServerConfig` from charla-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
struct WebhookState {
    bridge: Arc<Bridge>,
}

/// Builds the webhook router. Exposed separately for in-process tests.
pub fn webhook_router(bridge: Arc<Bridge>) -> Router {
    Router::new()
        .route("/webhook", post(post_webhook))
        .route("/health", get(get_health))
        .with_state(WebhookState { bridge })
        .layer(CorsLayer::permissive())
}

/// Binds and serves the webhook endpoint until the process exits.
pub async fn start_server(config: &ServerConfig, bridge: Arc<Bridge>) -> Result<(), CharlaError> {
    let app = webhook_router(bridge);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CharlaError::Channel {
            message: format!("failed to bind webhook server to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("webhook server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| CharlaError::Channel {
            message: format!("webhook server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

async fn post_webhook(State(state): State<WebhookState>, body: Bytes) -> (StatusCode, &'static str) {
    match serde_json::from_slice::<WebhookPayload>(&body) {
        Ok(payload) => router::route(Arc::clone(&state.bridge), payload).await,
        Err(error) => warn!(%error, "undecodable webhook payload ignored"),
    }
    (StatusCode::OK, "ok")
}

async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
