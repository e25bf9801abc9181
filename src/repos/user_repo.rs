/*
 * Responsibility
 * - users テーブル向け SQLx 操作
 * - PgPool を受け取り CRUD を提供
 * - password hash は認証時のみ取り出す (通常の Row には含めない)
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::partial_update::{ColumnRenames, PartialUpdate, bind_values};

/// API field -> users column
pub const COLUMN_RENAMES: &ColumnRenames = &[("username", "username"), ("password", "password")];

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub username: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserWithScoreRow {
    pub id: i32,
    pub username: String,
    // number of completed todos
    pub score: i64,
}

#[derive(FromRow)]
pub struct UserCredentialsRow {
    pub id: i32,
    pub username: String,
    pub password: String,
}

pub async fn find_credentials(
    db: &PgPool,
    username: &str,
) -> RepoResult<Option<UserCredentialsRow>> {
    let row = sqlx::query_as::<_, UserCredentialsRow>(
        r#"
        SELECT id, username, password
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(db: &PgPool, username: &str, password_hash: &str) -> RepoResult<UserRow> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (username, password)
        VALUES ($1, $2)
        RETURNING id, username
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn exists(db: &PgPool, user_id: i32) -> RepoResult<bool> {
    let found = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await?;

    Ok(found)
}

pub async fn get_with_score(db: &PgPool, user_id: i32) -> RepoResult<Option<UserWithScoreRow>> {
    let row = sqlx::query_as::<_, UserWithScoreRow>(
        r#"
        SELECT
            u.id,
            u.username,
            (
                SELECT COUNT(*)
                FROM todos t
                WHERE t.user_id = u.id AND t.complete_date IS NOT NULL
            ) AS score
        FROM users u
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// `changes` comes from `sql_for_partial_update` with `COLUMN_RENAMES`.
/// Any password value must already be hashed.
pub async fn update(
    db: &PgPool,
    user_id: i32,
    changes: &PartialUpdate,
) -> RepoResult<Option<UserRow>> {
    let sql = format!(
        r#"
        UPDATE users
        SET {}
        WHERE id = {}
        RETURNING id, username
        "#,
        changes.set_clause,
        changes.next_placeholder(1),
    );

    let row = bind_values(sqlx::query_as::<_, UserRow>(&sql), &changes.values)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: i32) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
