//! Authentication error types.
//!
//! Variants keep the precise failure for logs; the HTTP mapping collapses
//! every token failure into one generic 401 so callers cannot probe token
//! structure, and unknown-user / wrong-password into one login failure.

use axum::http::StatusCode;

use crate::gateway::types::{ApiError, error_codes};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("username already registered")]
    DuplicateUsername,

    /// Unknown username or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("malformed token")]
    MalformedToken,

    #[error("token signature mismatch")]
    BadSignature,

    #[error("token expired")]
    Expired,

    /// Token verified but its subject is no longer a stored identity.
    #[error("token subject not found")]
    UnknownSubject,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for failures that must surface as a bare "unauthorized".
    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            Self::MalformedToken | Self::BadSignature | Self::Expired | Self::UnknownSubject
        )
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::DuplicateUsername => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            e if e.is_token_failure() => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = err.http_status();
        match err {
            AuthError::DuplicateUsername => ApiError::new(
                status,
                error_codes::DUPLICATE_USERNAME,
                "Username already registered",
            ),
            AuthError::InvalidCredentials => ApiError::new(
                status,
                error_codes::AUTH_FAILED,
                "Incorrect username or password",
            )
            .with_bearer_challenge(),
            e if e.is_token_failure() => {
                tracing::debug!(reason = %e, "Bearer token rejected");
                ApiError::unauthorized("Could not validate credentials")
            }
            e => {
                tracing::error!("Auth failure: {:?}", e);
                ApiError::internal("Internal server error")
            }
        }
    }
}
