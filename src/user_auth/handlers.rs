use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;
use validator::Validate;

use super::models::{LoginRequest, RegisterRequest, TokenResponse, UserOut};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResult, ok};

/// Register a new user
///
/// POST /auth/register
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = UserOut),
        (status = 400, description = "Username already registered", body = crate::gateway::types::ApiResponse),
        (status = 422, description = "Invalid username or password", body = crate::gateway::types::ApiResponse)
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<UserOut> {
    let Json(req) = body?;
    req.validate()?;

    match state.user_auth.register(&req.username, &req.password).await {
        Ok(identity) => ok(UserOut::from(identity)),
        Err(e) => {
            tracing::warn!(username = %req.username, "Registration rejected: {}", e);
            Err(e.into())
        }
    }
}

/// Exchange username/password for a bearer token
///
/// POST /auth/token
#[utoipa::path(
    post,
    path = "/auth/token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Incorrect username or password", body = crate::gateway::types::ApiResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(req) = body?;
    req.validate()?;

    match state.user_auth.login(&req.username, &req.password).await {
        Ok(token) => ok(TokenResponse::bearer(token)),
        Err(e) => {
            tracing::warn!(username = %req.username, "Login failed: {}", e);
            Err(e.into())
        }
    }
}
