//! Owner lookup capability used by the resource-owner guard.
use async_trait::async_trait;
use thiserror::Error;

use crate::repos::error::RepoError;

#[derive(Debug, Error)]
pub enum OwnerLookupError {
    #[error("resource not found")]
    NotFound,
    #[error(transparent)]
    Backend(#[from] RepoError),
}

/// Resolves the immutable owner (subject id) of a resource.
///
/// Implementations only read; they never lock across the await.
#[async_trait]
pub trait OwnerLookup: Send + Sync + 'static {
    // Returns the owner's subject id, or `NotFound` when the resource does not exist.
    async fn owner_of(&self, resource_id: i32) -> Result<i32, OwnerLookupError>;
}
