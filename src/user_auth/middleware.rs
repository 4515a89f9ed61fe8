use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::gateway::{state::AppState, types::ApiError};

/// Pull the token out of `Authorization: Bearer <token>`.
/// The scheme name is matched case-insensitively.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::missing_auth("Not authenticated"))?;

    match auth_header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(ApiError::missing_auth("Not authenticated")),
    }
}

/// Verifies the bearer token and injects [`AuthenticatedUser`] for the handler.
///
/// [`AuthenticatedUser`]: super::models::AuthenticatedUser
pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?.to_owned();
    let user = state.user_auth.authorize(&token).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
