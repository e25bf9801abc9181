/*
 * Responsibility
 * - /todos 系 handler
 * - 一覧/作成は CurrentPrincipal の subject_id を owner として使う
 * - {todo_id} 系は require_resource_owner 通過後にのみ呼ばれる
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::{
            DeletedResponse,
            todos::{
                CreateTodoRequest, TodoDetailResponse, TodoEnvelope, TodoListResponse,
                TodoResponse, UpdateTodoRequest,
            },
        },
        extractors::{CurrentPrincipal, PathId, path_id::Todo},
    },
    error::AppError,
    repos::{partial_update::sql_for_partial_update, todo_repo, user_repo},
    state::AppState,
};

pub async fn create_todo(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoEnvelope<TodoResponse>>), AppError> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION", msg))?;

    let row = todo_repo::create(&state.db, &req.name, principal.subject_id, req.category_id).await?;

    Ok((StatusCode::CREATED, Json(TodoEnvelope { todo: row.into() })))
}

pub async fn list_open_todos(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<TodoListResponse>, AppError> {
    list_todos(&state, principal.subject_id, false).await
}

pub async fn list_todo_history(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<TodoListResponse>, AppError> {
    list_todos(&state, principal.subject_id, true).await
}

async fn list_todos(
    state: &AppState,
    user_id: i32,
    completed: bool,
) -> Result<Json<TodoListResponse>, AppError> {
    // the token outlives a deleted account
    if !user_repo::exists(&state.db, user_id).await? {
        return Err(AppError::not_found("user"));
    }

    let rows = todo_repo::list_for_user(&state.db, user_id, completed).await?;

    Ok(Json(TodoListResponse {
        todos: rows.into_iter().map(Into::into).collect(),
    }))
}

pub async fn get_todo(
    State(state): State<AppState>,
    PathId { id: todo_id, .. }: PathId<Todo>,
) -> Result<Json<TodoEnvelope<TodoDetailResponse>>, AppError> {
    let row = todo_repo::get(&state.db, todo_id)
        .await?
        .ok_or(AppError::not_found("todo"))?;

    Ok(Json(TodoEnvelope { todo: row.into() }))
}

pub async fn update_todo(
    State(state): State<AppState>,
    PathId { id: todo_id, .. }: PathId<Todo>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<TodoEnvelope<TodoResponse>>, AppError> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION", msg))?;

    let changes = sql_for_partial_update(&req.into_updates(), todo_repo::COLUMN_RENAMES)?;
    let row = todo_repo::update(&state.db, todo_id, &changes)
        .await?
        .ok_or(AppError::not_found("todo"))?;

    Ok(Json(TodoEnvelope { todo: row.into() }))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    PathId { id: todo_id, .. }: PathId<Todo>,
) -> Result<Json<DeletedResponse>, AppError> {
    if !todo_repo::delete(&state.db, todo_id).await? {
        return Err(AppError::not_found("todo"));
    }

    Ok(Json(DeletedResponse { deleted: todo_id }))
}
