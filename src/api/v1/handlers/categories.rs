/*
 * Responsibility
 * - GET /categories, GET /categories/{category_id} (要ログイン)
 */
use axum::{
    Json,
    extract::State,
};

use crate::{
    api::v1::{
        dto::categories::{CategoryEnvelope, CategoryListResponse},
        extractors::{PathId, path_id::Category},
    },
    error::AppError,
    repos::category_repo,
    state::AppState,
};

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoryListResponse>, AppError> {
    let rows = category_repo::list(&state.db).await?;

    Ok(Json(CategoryListResponse {
        categories: rows.into_iter().map(Into::into).collect(),
    }))
}

pub async fn get_category(
    State(state): State<AppState>,
    PathId { id: category_id, .. }: PathId<Category>,
) -> Result<Json<CategoryEnvelope>, AppError> {
    let row = category_repo::get(&state.db, category_id)
        .await?
        .ok_or(AppError::not_found("category"))?;

    Ok(Json(CategoryEnvelope {
        category: row.into(),
    }))
}
