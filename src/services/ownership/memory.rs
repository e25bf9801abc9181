use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::services::ownership::lookup::{OwnerLookup, OwnerLookupError};

/// In-process owner table. Used to run the guards without a database.
#[derive(Clone, Debug, Default)]
pub struct InMemoryOwners {
    owners: Arc<RwLock<HashMap<i32, i32>>>,
}

impl InMemoryOwners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owner(self, resource_id: i32, owner_id: i32) -> Self {
        self.insert(resource_id, owner_id);
        self
    }

    pub fn insert(&self, resource_id: i32, owner_id: i32) {
        let mut owners = self.owners.write().unwrap_or_else(|e| e.into_inner());
        owners.insert(resource_id, owner_id);
    }
}

#[async_trait]
impl OwnerLookup for InMemoryOwners {
    async fn owner_of(&self, resource_id: i32) -> Result<i32, OwnerLookupError> {
        let owners = self.owners.read().unwrap_or_else(|e| e.into_inner());
        owners
            .get(&resource_id)
            .copied()
            .ok_or(OwnerLookupError::NotFound)
    }
}
