//! Health check handler

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::ApiError;

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_u64)]
    pub timestamp_ms: u64,
    /// Git revision the binary was built from
    #[schema(example = "a1b2c3d")]
    pub build: &'static str,
}

/// Health check endpoint
///
/// Pings the database but never exposes why it failed.
///
/// - Healthy: 200 OK + {timestamp_ms, build}
/// - Unhealthy: 503 Service Unavailable + {code, msg}
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> axum::response::Response {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                timestamp_ms: now_ms,
                build: env!("GIT_HASH"),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("[HEALTH] database ping failed: {}", e);
            ApiError::service_unavailable("unavailable").into_response()
        }
    }
}
