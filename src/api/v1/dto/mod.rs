/*
 * Responsibility
 * - request/response DTO (JSON 形状のみ。DB Row からの変換は From で)
 */
use serde::Serialize;

pub mod auth;
pub mod categories;
pub mod todos;
pub mod users;

/// `{ "deleted": id }`
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: i32,
}
