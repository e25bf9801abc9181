/*
 * Responsibility
 * - POST /auth/token, POST /auth/register (公開 route)
 * - password 検証/hash → TokenCodec で bearer token を発行
 * - 認証失敗の理由 (user 不在 / password 不一致) は区別して返さない
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    api::v1::dto::auth::{CredentialsRequest, TokenResponse},
    error::AppError,
    repos::{error::RepoError, user_repo},
    services::auth::{
        IdentityClaims,
        password::{hash_password_blocking, verify_password_blocking},
    },
    state::AppState,
};

pub async fn issue_token(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION", msg))?;

    let Some(user) = user_repo::find_credentials(&state.db, &req.username).await? else {
        tracing::debug!(username = %req.username, "login for unknown user");
        return Err(AppError::Unauthorized);
    };

    if !verify_password_blocking(req.password, user.password).await? {
        tracing::debug!(user_id = user.id, "login with wrong password");
        return Err(AppError::Unauthorized);
    }

    let token = state
        .tokens
        .issue(&IdentityClaims::new(user.id, user.username))?;

    Ok(Json(TokenResponse { token }))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let Json(req) = payload?;
    req.validate_registration()
        .map_err(|msg| AppError::bad_request("VALIDATION", msg))?;

    let password_hash = hash_password_blocking(req.password).await?;
    let user = user_repo::create(&state.db, &req.username, &password_hash)
        .await
        .map_err(|e| match e {
            RepoError::Conflict => AppError::bad_request(
                "DUPLICATE_USERNAME",
                format!("Duplicate username: {}", req.username),
            ),
            other => other.into(),
        })?;

    tracing::info!(user_id = user.id, "user registered");

    let token = state
        .tokens
        .issue(&IdentityClaims::new(user.id, user.username))?;

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}
