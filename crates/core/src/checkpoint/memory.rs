use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

use super::{CheckpointError, KeyValueCheckpoint};

/// In-memory checkpoint, for tests. Clones share the stored value.
#[derive(Debug, Clone)]
pub struct MemoryCheckpoint<T> {
    value: Arc<RwLock<Option<T>>>,
}

impl<T> Default for MemoryCheckpoint<T> {
    fn default() -> Self {
        Self {
            value: Arc::new(RwLock::new(None)),
        }
    }
}

impl<T: Clone> MemoryCheckpoint<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(Some(value))),
        }
    }

    pub async fn get(&self) -> Option<T> {
        self.value.read().await.clone()
    }
}

#[async_trait]
impl<T> KeyValueCheckpoint<T> for MemoryCheckpoint<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    async fn load(&self) -> Result<Option<T>, CheckpointError> {
        Ok(self.value.read().await.clone())
    }

    async fn save(&self, value: &T) -> Result<(), CheckpointError> {
        *self.value.write().await = Some(value.clone());
        Ok(())
    }
}
