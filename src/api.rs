//! HTTP surface for the transport bridge
//!
//! The chat transport runs as a separate process and forwards inbound
//! events here. Every request must carry the shared transport token.

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::assistant::Assistant;
use crate::transport::{InboundMessage, Reply};

const TRANSPORT_TOKEN_HEADER: &str = "x-transport-token";

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub assistant: Arc<Assistant>,
    pub transport_token: Arc<String>,
}

fn authorized(state: &ApiState, headers: &HeaderMap) -> bool {
    headers
        .get(TRANSPORT_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|token| token == state.transport_token.as_str())
        .unwrap_or(false)
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Message Endpoint
/// =============================

async fn handle_message(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(message): Json<InboundMessage>,
) -> (StatusCode, Json<ApiResponse>) {
    if !authorized(&state, &headers) {
        warn!("rejected transport request with missing or invalid token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("invalid transport token".to_string())),
        );
    }

    info!(user_id = message.user_id, "received transport event");

    let reply: Reply = state.assistant.handle(&message).await;

    (StatusCode::OK, Json(ApiResponse::success(reply)))
}

/// =============================
/// Router
/// =============================

pub fn create_router(assistant: Arc<Assistant>, transport_token: String) -> Router {
    let state = ApiState {
        assistant,
        transport_token: Arc::new(transport_token),
    };

    Router::new()
        .route("/health", axum::routing::get(health))
        .route("/api/message", post(handle_message))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    assistant: Arc<Assistant>,
    transport_token: String,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(assistant, transport_token);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
