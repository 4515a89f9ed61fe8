//! Knowledge entry data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Stored entry; `author_id` references `users.id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct KnowledgeEntry {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Tuning Argon2")]
    pub title: String,
    pub content: String,
    #[schema(example = "security")]
    pub category: Option<String>,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for both create and update; update replaces all three fields.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EntryInput {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    #[schema(example = "Tuning Argon2")]
    pub title: String,
    pub content: String,
    #[validate(length(max = 100, message = "category must be at most 100 characters"))]
    #[schema(example = "security")]
    pub category: Option<String>,
}

/// Query parameters for listing entries
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListEntriesQuery {
    /// Number of entries to skip
    pub skip: Option<i64>,
    /// Page size (1-100, default 10)
    pub limit: Option<i64>,
    /// Only entries written by this user
    pub author_id: Option<i64>,
}

impl ListEntriesQuery {
    /// (offset, limit) with negative offsets floored to 0 and the limit clamped.
    pub fn page(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (skip, limit)
    }
}
