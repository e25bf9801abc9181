/*
 * Responsibility
 * - /users/{user_id} の GET / PATCH / DELETE handler
 * - 本人確認は routes 側の require_matching_subject が済ませている
 * - PATCH の password は hash してから部分更新に渡す
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    api::v1::{
        dto::{
            DeletedResponse,
            users::{UpdateUserRequest, UserEnvelope, UserResponse, UserWithScoreResponse},
        },
        extractors::{PathId, path_id::User},
    },
    error::AppError,
    repos::{
        partial_update::{FieldUpdates, sql_for_partial_update},
        user_repo,
    },
    services::auth::password::hash_password_blocking,
    state::AppState,
};

pub async fn get_user(
    State(state): State<AppState>,
    PathId { id: user_id, .. }: PathId<User>,
) -> Result<Json<UserEnvelope<UserWithScoreResponse>>, AppError> {
    let row = user_repo::get_with_score(&state.db, user_id)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(UserEnvelope { user: row.into() }))
}

pub async fn update_user(
    State(state): State<AppState>,
    PathId { id: user_id, .. }: PathId<User>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserEnvelope<UserResponse>>, AppError> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION", msg))?;

    let mut updates = FieldUpdates::new();
    if let Some(username) = req.username {
        updates.insert("username", username);
    }
    if let Some(password) = req.password {
        updates.insert("password", hash_password_blocking(password).await?);
    }

    let changes = sql_for_partial_update(&updates, user_repo::COLUMN_RENAMES)?;
    let row = user_repo::update(&state.db, user_id, &changes)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(UserEnvelope { user: row.into() }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    PathId { id: user_id, .. }: PathId<User>,
) -> Result<Json<DeletedResponse>, AppError> {
    if !user_repo::delete(&state.db, user_id).await? {
        return Err(AppError::not_found("user"));
    }

    tracing::info!(user_id, "user deleted");
    Ok(Json(DeletedResponse { deleted: user_id }))
}
