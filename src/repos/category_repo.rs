/*
 * Responsibility
 * - categories は事前投入のみ。READ のみ提供
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: i32,
    pub name: String,
}

pub async fn list(db: &PgPool) -> RepoResult<Vec<CategoryRow>> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT id, name
        FROM categories
        ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, category_id: i32) -> RepoResult<Option<CategoryRow>> {
    let row = sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT id, name
        FROM categories
        WHERE id = $1
        "#,
    )
    .bind(category_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}
