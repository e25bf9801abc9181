/*
 * Responsibility
 * - Todos の request/response DTO (JSON は camelCase)
 * - PATCH body を FieldUpdates に変換する。key は API 側の名前のまま
 *   (column への rename は todo_repo::COLUMN_RENAMES)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;

use crate::repos::partial_update::FieldUpdates;
use crate::repos::todo_repo::{TodoDetailRow, TodoRow};

pub const NAME_MAX_LEN: usize = 100;

fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("name cannot be empty");
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err("name must be <= 100 chars");
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTodoRequest {
    pub name: String,
    pub category_id: i32,
}

impl CreateTodoRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_name(&self.name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTodoRequest {
    pub name: Option<String>,
    pub category_id: Option<i32>,
    // None: keep, Some(None): clear (reopen), Some(Some(t)): mark complete at t
    #[serde(default, with = "double_option")]
    pub complete_date: Option<Option<DateTime<Utc>>>,
}

impl UpdateTodoRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        Ok(())
    }

    pub fn into_updates(self) -> FieldUpdates {
        let mut updates = FieldUpdates::new();
        if let Some(name) = self.name {
            updates.insert("name", name);
        }
        if let Some(category_id) = self.category_id {
            updates.insert("categoryId", category_id);
        }
        if let Some(complete_date) = self.complete_date {
            updates.insert("completeDate", complete_date);
        }
        updates
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
    pub category_id: i32,
    pub complete_date: Option<DateTime<Utc>>,
}

impl From<TodoRow> for TodoResponse {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            user_id: row.user_id,
            category_id: row.category_id,
            complete_date: row.complete_date,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDetailResponse {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
    pub category_id: i32,
    pub complete_date: Option<DateTime<Utc>>,
    pub user_username: String,
    pub category_name: String,
}

impl From<TodoDetailRow> for TodoDetailResponse {
    fn from(row: TodoDetailRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            user_id: row.user_id,
            category_id: row.category_id,
            complete_date: row.complete_date,
            user_username: row.user_username,
            category_name: row.category_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TodoEnvelope<T> {
    pub todo: T,
}

#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    pub todos: Vec<TodoDetailResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::partial_update::{SqlValue, sql_for_partial_update};
    use crate::repos::todo_repo::COLUMN_RENAMES;

    #[test]
    fn missing_and_null_complete_date_differ() {
        let missing: UpdateTodoRequest = serde_json::from_str(r#"{"name":"a"}"#).unwrap();
        assert_eq!(missing.complete_date, None);

        let null: UpdateTodoRequest = serde_json::from_str(r#"{"completeDate":null}"#).unwrap();
        assert_eq!(null.complete_date, Some(None));
    }

    #[test]
    fn updates_follow_body_fields_and_rename_to_columns() {
        let req: UpdateTodoRequest = serde_json::from_str(
            r#"{"name":"walk dog","categoryId":3,"completeDate":"2024-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        let changes = sql_for_partial_update(&req.into_updates(), COLUMN_RENAMES).unwrap();

        assert_eq!(
            changes.set_clause,
            r#""name"=$1, "category_id"=$2, "complete_date"=$3"#
        );
        assert_eq!(changes.values[1], SqlValue::Int(Some(3)));
    }

    #[test]
    fn null_complete_date_becomes_a_typed_null() {
        let req: UpdateTodoRequest = serde_json::from_str(r#"{"completeDate":null}"#).unwrap();
        let updates = req.into_updates();
        let (field, value) = updates.iter().next().unwrap();
        assert_eq!(field, "completeDate");
        assert_eq!(*value, SqlValue::Timestamp(None));
    }

    #[test]
    fn owner_cannot_be_patched() {
        let res = serde_json::from_str::<UpdateTodoRequest>(r#"{"userId":2}"#);
        assert!(res.is_err());
    }

    #[test]
    fn responses_are_camel_case() {
        let body = serde_json::to_value(TodoResponse {
            id: 1,
            name: "a".into(),
            user_id: 2,
            category_id: 3,
            complete_date: None,
        })
        .unwrap();
        assert_eq!(body["userId"], 2);
        assert_eq!(body["categoryId"], 3);
        assert!(body["completeDate"].is_null());
    }
}
