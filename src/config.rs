use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::user_auth::token::SigningAlgorithm;

/// Longest accepted token lifetime: one year.
pub const MAX_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for tokio's blocking pool, which runs password hashing.
    #[serde(default = "default_blocking_threads")]
    pub blocking_threads: usize,
}

fn default_blocking_threads() -> usize {
    8
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://kb.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

/// Token signing and password hashing settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub secret_key: String,
    #[serde(default)]
    pub algorithm: SigningAlgorithm,
    pub ttl_minutes: i64,
    #[serde(default)]
    pub password_hash: PasswordHashConfig,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("ttl_minutes", &self.ttl_minutes)
            .field("password_hash", &self.password_hash)
            .finish()
    }
}

/// Argon2id work factor.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        // argon2 crate defaults (OWASP minimum for Argon2id)
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`, apply environment and `--port` overrides,
    /// then validate.
    pub fn load(env: &str, port_override: Option<u16>) -> Result<Self> {
        Self::load_from(
            format!("config/{}.yaml", env),
            |key| std::env::var(key).ok(),
            port_override,
        )
    }

    /// Validation always runs last so no override can bypass it.
    pub fn load_from<F>(
        path: impl AsRef<Path>,
        lookup: F,
        port_override: Option<u16>,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides(lookup)?;
        if let Some(port) = port_override {
            config.server.port = port;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Overrides honoured on top of the YAML file:
    /// `DATABASE_URL`, `SECRET_KEY`, `ACCESS_TOKEN_EXPIRE_MINUTES`, `ALGORITHM`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = lookup("SECRET_KEY") {
            self.auth.secret_key = secret;
        }
        if let Some(ttl) = lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            self.auth.ttl_minutes = ttl
                .trim()
                .parse()
                .with_context(|| format!("ACCESS_TOKEN_EXPIRE_MINUTES is not an integer: {ttl}"))?;
        }
        if let Some(alg) = lookup("ALGORITHM") {
            self.auth.algorithm = alg.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.secret_key.is_empty() {
            bail!("auth.secret_key must not be empty");
        }
        if !(1..=MAX_TTL_MINUTES).contains(&self.auth.ttl_minutes) {
            bail!(
                "auth.ttl_minutes must be between 1 and {}, got {}",
                MAX_TTL_MINUTES,
                self.auth.ttl_minutes
            );
        }
        if self.server.port == 0 {
            bail!("server.port must not be 0");
        }
        if self.server.blocking_threads == 0 {
            bail!("server.blocking_threads must be at least 1");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be at least 1");
        }
        let ph = &self.auth.password_hash;
        argon2::Params::new(ph.memory_kib, ph.iterations, ph.parallelism, None)
            .map_err(|e| anyhow::anyhow!("auth.password_hash is invalid: {}", e))?;
        Ok(())
    }
}
