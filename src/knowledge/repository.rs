//! Entry storage. Authorship is a plain `author_id` column; "entries by
//! author" is a query, not an object graph.

use chrono::Utc;
use sqlx::SqlitePool;

use super::models::{EntryInput, KnowledgeEntry};

const ENTRY_COLUMNS: &str = "id, title, content, category, author_id, created_at, updated_at";

pub struct EntryRepository;

impl EntryRepository {
    /// Page through all entries, oldest first
    pub async fn list(
        pool: &SqlitePool,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<KnowledgeEntry>, sqlx::Error> {
        sqlx::query_as::<_, KnowledgeEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(skip)
        .fetch_all(pool)
        .await
    }

    pub async fn list_by_author(
        pool: &SqlitePool,
        author_id: i64,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<KnowledgeEntry>, sqlx::Error> {
        sqlx::query_as::<_, KnowledgeEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE author_id = ? ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(author_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(pool)
        .await
    }

    pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<KnowledgeEntry>, sqlx::Error> {
        sqlx::query_as::<_, KnowledgeEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        input: &EntryInput,
        author_id: i64,
    ) -> Result<KnowledgeEntry, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, KnowledgeEntry>(&format!(
            "INSERT INTO entries (title, content, category, author_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.category)
        .bind(author_id)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Replace title/content/category and bump `updated_at`.
    /// Returns `None` when the entry does not exist.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        input: &EntryInput,
    ) -> Result<Option<KnowledgeEntry>, sqlx::Error> {
        sqlx::query_as::<_, KnowledgeEntry>(&format!(
            "UPDATE entries SET title = ?, content = ?, category = ?, updated_at = ?
             WHERE id = ?
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.category)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Returns whether a row was deleted
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
