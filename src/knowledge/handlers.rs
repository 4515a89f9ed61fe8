//! Entry CRUD handlers. Every route sits behind the bearer middleware, which
//! supplies the caller as an `AuthenticatedUser` extension.

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;
use validator::Validate;

use super::models::{EntryInput, KnowledgeEntry, ListEntriesQuery};
use super::repository::EntryRepository;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResult, ok};
use crate::user_auth::AuthenticatedUser;

/// List entries
///
/// GET /knowledge
#[utoipa::path(
    get,
    path = "/knowledge",
    params(ListEntriesQuery),
    responses(
        (status = 200, description = "Entries, oldest first", body = Vec<KnowledgeEntry>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Knowledge"
)]
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    query: Result<Query<ListEntriesQuery>, QueryRejection>,
) -> ApiResult<Vec<KnowledgeEntry>> {
    let Query(params) = query?;
    let (skip, limit) = params.page();
    let pool = state.db.pool();

    let entries = match params.author_id {
        Some(author_id) => EntryRepository::list_by_author(pool, author_id, skip, limit).await,
        None => EntryRepository::list(pool, skip, limit).await,
    }
    .map_err(ApiError::db_error)?;

    ok(entries)
}

/// Create an entry authored by the caller
///
/// POST /knowledge
#[utoipa::path(
    post,
    path = "/knowledge",
    request_body = EntryInput,
    responses(
        (status = 200, description = "Entry created", body = KnowledgeEntry),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid entry")
    ),
    security(("bearer_auth" = [])),
    tag = "Knowledge"
)]
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Json<EntryInput>, JsonRejection>,
) -> ApiResult<KnowledgeEntry> {
    let Json(input) = body?;
    input.validate()?;

    let entry = EntryRepository::create(state.db.pool(), &input, user.user_id)
        .await
        .map_err(ApiError::db_error)?;
    tracing::info!(entry_id = entry.id, author_id = user.user_id, "Entry created");
    ok(entry)
}

/// Get one entry
///
/// GET /knowledge/{entry_id}
#[utoipa::path(
    get,
    path = "/knowledge/{entry_id}",
    params(("entry_id" = i64, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry", body = KnowledgeEntry),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Knowledge"
)]
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<KnowledgeEntry> {
    let Path(entry_id) = path?;
    match EntryRepository::get(state.db.pool(), entry_id).await {
        Ok(Some(entry)) => ok(entry),
        Ok(None) => ApiError::not_found("Entry not found").into_err(),
        Err(e) => ApiError::db_error(e).into_err(),
    }
}

/// Replace an entry's fields (author only)
///
/// PUT /knowledge/{entry_id}
#[utoipa::path(
    put,
    path = "/knowledge/{entry_id}",
    params(("entry_id" = i64, Path, description = "Entry ID")),
    request_body = EntryInput,
    responses(
        (status = 200, description = "Entry updated", body = KnowledgeEntry),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Entry not found"),
        (status = 422, description = "Invalid entry")
    ),
    security(("bearer_auth" = [])),
    tag = "Knowledge"
)]
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<EntryInput>, JsonRejection>,
) -> ApiResult<KnowledgeEntry> {
    let Path(entry_id) = path?;
    let Json(input) = body?;
    input.validate()?;
    ensure_author(&state, entry_id, &user).await?;

    match EntryRepository::update(state.db.pool(), entry_id, &input).await {
        Ok(Some(entry)) => ok(entry),
        // deleted between the ownership check and the update
        Ok(None) => ApiError::not_found("Entry not found").into_err(),
        Err(e) => ApiError::db_error(e).into_err(),
    }
}

/// Delete an entry (author only)
///
/// DELETE /knowledge/{entry_id}
#[utoipa::path(
    delete,
    path = "/knowledge/{entry_id}",
    params(("entry_id" = i64, Path, description = "Entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Knowledge"
)]
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(entry_id) = path?;
    ensure_author(&state, entry_id, &user).await?;

    if EntryRepository::delete(state.db.pool(), entry_id)
        .await
        .map_err(ApiError::db_error)?
    {
        tracing::info!(entry_id, author_id = user.user_id, "Entry deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Entry not found"))
    }
}

async fn ensure_author(
    state: &AppState,
    entry_id: i64,
    user: &AuthenticatedUser,
) -> Result<(), ApiError> {
    let entry = EntryRepository::get(state.db.pool(), entry_id)
        .await
        .map_err(ApiError::db_error)?
        .ok_or_else(|| ApiError::not_found("Entry not found"))?;

    if entry.author_id != user.user_id {
        tracing::warn!(
            entry_id,
            author_id = entry.author_id,
            caller = user.user_id,
            "Modification by non-author rejected"
        );
        return Err(ApiError::forbidden("Only the author may modify this entry"));
    }
    Ok(())
}
