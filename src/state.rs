/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - db: PgPool, tokens: TokenCodec, todo_owners: OwnerLookup
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{auth::TokenCodec, ownership::OwnerLookup};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub tokens: Arc<TokenCodec>,
    pub todo_owners: Arc<dyn OwnerLookup>,
}

impl AppState {
    pub fn new(
        db: sqlx::PgPool,
        tokens: Arc<TokenCodec>,
        todo_owners: Arc<dyn OwnerLookup>,
    ) -> Self {
        Self {
            db,
            tokens,
            todo_owners,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
