//! User authentication: credential storage, Argon2 password checks and
//! stateless bearer tokens.
//!
//! ## Components
//! - `repository`: identity lookup / creation
//! - `password`: salted Argon2id hashing on the blocking pool
//! - `token`: JWT issue / verify
//! - `service`: register, login, authorize
//! - `middleware`: Axum bearer-token guard
//! - `handlers`: `/auth/register`, `/auth/token`

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

pub use error::AuthError;
pub use middleware::{extract_bearer_token, jwt_auth_middleware};
pub use models::{AuthenticatedUser, Identity, LoginRequest, RegisterRequest, TokenResponse, UserOut};
pub use password::CredentialHasher;
pub use repository::UserRepository;
pub use service::UserAuthService;
pub use token::{Claims, SigningAlgorithm, TokenService};
