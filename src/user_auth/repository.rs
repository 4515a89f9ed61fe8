//! Identity storage.
//!
//! Uses runtime queries to avoid sqlx compile-time database connection.

use chrono::Utc;
use sqlx::SqlitePool;

use super::error::AuthError;
use super::models::Identity;

/// User repository: one statement per call, no transactions.
pub struct UserRepository;

impl UserRepository {
    /// Exact, case-sensitive username lookup
    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<Identity>, sqlx::Error> {
        sqlx::query_as::<_, Identity>(
            r#"SELECT id, username, hashed_password, created_at
               FROM users WHERE username = ?"#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Insert an already-hashed credential. The UNIQUE constraint on
    /// `username` decides duplicates, so two concurrent registrations of the
    /// same name cannot both succeed.
    pub async fn create(
        pool: &SqlitePool,
        username: &str,
        password_hash: &str,
    ) -> Result<Identity, AuthError> {
        sqlx::query_as::<_, Identity>(
            r#"INSERT INTO users (username, hashed_password, created_at)
               VALUES (?, ?, ?)
               RETURNING id, username, hashed_password, created_at"#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AuthError::DuplicateUsername
            }
            other => AuthError::Database(other),
        })
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }
}
