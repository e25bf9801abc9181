/*
 * Responsibility
 * - Users の request/response DTO
 * - PATCH は username / password のみ。未知の field は 400
 */
use serde::{Deserialize, Serialize};

use crate::api::v1::dto::auth::{validate_password, validate_username};
use crate::repos::user_repo::{UserRow, UserWithScoreRow};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    // plain text; hashed by the handler before it reaches the update map
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserWithScoreResponse {
    pub id: i32,
    pub username: String,
    pub score: i64,
}

impl From<UserWithScoreRow> for UserWithScoreResponse {
    fn from(row: UserWithScoreRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            score: row.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope<T> {
    pub user: T,
}
