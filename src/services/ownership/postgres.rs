use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::todo_repo;
use crate::services::ownership::lookup::{OwnerLookup, OwnerLookupError};

/// Todo ownership backed by the `todos.user_id` column.
#[derive(Clone, Debug)]
pub struct PgTodoOwners {
    pool: PgPool,
}

impl PgTodoOwners {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnerLookup for PgTodoOwners {
    async fn owner_of(&self, resource_id: i32) -> Result<i32, OwnerLookupError> {
        todo_repo::owner_of(&self.pool, resource_id)
            .await?
            .ok_or(OwnerLookupError::NotFound)
    }
}
