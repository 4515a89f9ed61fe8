//! Bearer token issuing and verification (HMAC-signed JWT).
//!
//! Tokens are stateless: nothing is stored server side, so a token stays valid
//! until `exp` unless the signing secret changes.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::AuthError;
use crate::config::AuthConfig;

/// Symmetric signing algorithms accepted for the shared secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    #[default]
    HS256,
    HS384,
    HS512,
}

impl SigningAlgorithm {
    fn as_jwt(self) -> Algorithm {
        match self {
            Self::HS256 => Algorithm::HS256,
            Self::HS384 => Algorithm::HS384,
            Self::HS512 => Algorithm::HS512,
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            other => Err(anyhow::anyhow!(
                "Unsupported signing algorithm '{}' (expected HS256, HS384 or HS512)",
                other
            )),
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // username
    pub exp: i64,    // unix seconds
    pub iat: i64,
}

/// Signs and verifies access tokens with one immutable secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: SigningAlgorithm,
    ttl: Duration,
}

impl TokenService {
    pub fn new(
        secret: &str,
        algorithm: SigningAlgorithm,
        ttl_minutes: i64,
    ) -> Result<Self, AuthError> {
        let ttl = Duration::try_minutes(ttl_minutes)
            .ok_or_else(|| AuthError::Internal(format!("Token TTL out of range: {ttl_minutes} minutes")))?;
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            ttl,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        Self::new(&config.secret_key, config.algorithm, config.ttl_minutes)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, username: &str) -> Result<String, AuthError> {
        self.issue_at(username, Utc::now())
    }

    pub fn issue_at(&self, username: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Internal("Token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: username.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::new(self.algorithm.as_jwt()),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| AuthError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify `token` and return the subject (username).
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Signature first, then expiry: `decode` rejects a bad signature before
    /// the claims are deserialized, and `exp` is only read afterwards.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let mut validation = Validation::new(self.algorithm.as_jwt());
        // exp is checked below against the caller's clock with no leeway
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| classify(e.kind()))?;

        if now.timestamp() >= data.claims.exp {
            return Err(AuthError::Expired);
        }
        Ok(data.claims.sub)
    }
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::BadSignature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::MalformedToken,
    }
}
