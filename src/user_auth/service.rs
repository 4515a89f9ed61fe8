use once_cell::sync::OnceCell;
use sqlx::SqlitePool;

use super::error::AuthError;
use super::models::{AuthenticatedUser, Identity};
use super::password::CredentialHasher;
use super::repository::UserRepository;
use super::token::TokenService;
use crate::config::AuthConfig;

/// Register / login / authorize over the users table.
///
/// Holds only immutable state after construction; share it behind an `Arc`.
pub struct UserAuthService {
    db: SqlitePool,
    hasher: CredentialHasher,
    tokens: TokenService,
    // Verified against when the username is unknown, so that path costs the
    // same as a wrong password.
    dummy_hash: OnceCell<String>,
}

impl UserAuthService {
    pub fn new(db: SqlitePool, hasher: CredentialHasher, tokens: TokenService) -> Self {
        Self {
            db,
            hasher,
            tokens,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn from_config(db: SqlitePool, config: &AuthConfig) -> Result<Self, AuthError> {
        let hasher = CredentialHasher::new(config.password_hash)?;
        Ok(Self::new(db, hasher, TokenService::from_config(config)?))
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new user
    pub async fn register(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let password_hash = self.hasher.hash_blocking(password.to_string()).await?;
        let identity = UserRepository::create(&self.db, username, &password_hash).await?;
        tracing::info!(user_id = identity.id, username = %identity.username, "User registered");
        Ok(identity)
    }

    /// Check the credential pair and return the stored identity.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let user = UserRepository::find_by_username(&self.db, username).await?;

        let stored_hash = match &user {
            Some(u) => u.password_hash.clone(),
            None => self.dummy_hash()?.to_string(),
        };
        let matches = self
            .hasher
            .verify_blocking(password.to_string(), stored_hash)
            .await?;

        match user {
            Some(u) if matches => Ok(u),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    /// Login user and issue a bearer token
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let identity = self.authenticate(username, password).await?;
        let token = self.tokens.issue(&identity.username)?;
        tracing::info!(user_id = identity.id, "Access token issued");
        Ok(token)
    }

    /// Verify a bearer token and resolve it to a stored identity.
    pub async fn authorize(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let username = self.tokens.verify(token)?;
        let identity = UserRepository::find_by_username(&self.db, &username)
            .await?
            .ok_or(AuthError::UnknownSubject)?;
        Ok(AuthenticatedUser::from(&identity))
    }

    fn dummy_hash(&self) -> Result<&str, AuthError> {
        self.dummy_hash
            .get_or_try_init(|| self.hasher.hash("dummy-password-for-timing"))
            .map(String::as_str)
    }
}
