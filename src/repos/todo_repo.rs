/*
 * Responsibility
 * - todos CRUD
 * - user_id (owner) は作成時に固定。update の rename 表に含めない
 * - 一覧/詳細は users, categories を JOIN した表示用 Row を返す
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::partial_update::{ColumnRenames, PartialUpdate, bind_values};

/// API field -> todos column
pub const COLUMN_RENAMES: &ColumnRenames = &[
    ("categoryId", "category_id"),
    ("completeDate", "complete_date"),
];

#[derive(Debug, Clone, FromRow)]
pub struct TodoRow {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
    pub category_id: i32,
    pub complete_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TodoDetailRow {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
    pub category_id: i32,
    pub complete_date: Option<DateTime<Utc>>,
    pub user_username: String,
    pub category_name: String,
}

const DETAIL_SELECT: &str = r#"
        SELECT
            t.id, t.name, t.user_id, t.category_id, t.complete_date,
            u.username AS user_username,
            c.name AS category_name
        FROM todos t
        JOIN users u ON t.user_id = u.id
        JOIN categories c ON t.category_id = c.id
"#;

pub async fn create(
    db: &PgPool,
    name: &str,
    user_id: i32,
    category_id: i32,
) -> RepoResult<TodoRow> {
    let row = sqlx::query_as::<_, TodoRow>(
        r#"
        INSERT INTO todos (name, user_id, category_id)
        VALUES ($1, $2, $3)
        RETURNING id, name, user_id, category_id, complete_date
        "#,
    )
    .bind(name)
    .bind(user_id)
    .bind(category_id)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn get(db: &PgPool, todo_id: i32) -> RepoResult<Option<TodoDetailRow>> {
    let sql = format!("{DETAIL_SELECT} WHERE t.id = $1");
    let row = sqlx::query_as::<_, TodoDetailRow>(&sql)
        .bind(todo_id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

/// Open (`completed = false`) or completed todos of one user.
pub async fn list_for_user(
    db: &PgPool,
    user_id: i32,
    completed: bool,
) -> RepoResult<Vec<TodoDetailRow>> {
    let sql = format!(
        "{DETAIL_SELECT} WHERE t.user_id = $1 AND (t.complete_date IS NOT NULL) = $2 ORDER BY t.id"
    );
    let rows = sqlx::query_as::<_, TodoDetailRow>(&sql)
        .bind(user_id)
        .bind(completed)
        .fetch_all(db)
        .await?;

    Ok(rows)
}

pub async fn owner_of(db: &PgPool, todo_id: i32) -> RepoResult<Option<i32>> {
    let owner = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT user_id
        FROM todos
        WHERE id = $1
        "#,
    )
    .bind(todo_id)
    .fetch_optional(db)
    .await?;

    Ok(owner)
}

/// `changes` comes from `sql_for_partial_update` with `COLUMN_RENAMES`.
pub async fn update(
    db: &PgPool,
    todo_id: i32,
    changes: &PartialUpdate,
) -> RepoResult<Option<TodoRow>> {
    let sql = format!(
        r#"
        UPDATE todos
        SET {}
        WHERE id = {}
        RETURNING id, name, user_id, category_id, complete_date
        "#,
        changes.set_clause,
        changes.next_placeholder(1),
    );

    let row = bind_values(sqlx::query_as::<_, TodoRow>(&sql), &changes.values)
        .bind(todo_id)
        .fetch_optional(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn delete(db: &PgPool, todo_id: i32) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM todos
        WHERE id = $1
        "#,
    )
    .bind(todo_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
