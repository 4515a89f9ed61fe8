use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

/// Stored user record. Only the repository builds these; `password_hash`
/// never leaves the process.
#[derive(Clone, sqlx::FromRow)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    #[sqlx(rename = "hashed_password")]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Identity attached to a request once its bearer token has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
}

impl From<&Identity> for AuthenticatedUser {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: identity.id,
            username: identity.username.clone(),
        }
    }
}

/// User Registration Request
#[derive(Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    #[schema(example = "secret123")]
    pub password: String,
}

/// User Login Request
#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    #[schema(example = "secret123")]
    pub password: String,
}

// Credentials must never reach a log line.
macro_rules! redacted_debug {
    ($ty:ident) => {
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($ty))
                    .field("username", &self.username)
                    .field("password", &"<redacted>")
                    .finish()
            }
        }
    };
}

redacted_debug!(RegisterRequest);
redacted_debug!(LoginRequest);

/// Public view of a user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserOut {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "alice")]
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<Identity> for UserOut {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username,
            created_at: identity.created_at,
        }
    }
}

/// Token response (OAuth2 bearer shape)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
