use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use super::CheckpointError;

/// A single persisted value, such as the run cursor or the link set.
#[async_trait]
pub trait KeyValueCheckpoint<T>: Send + Sync
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    /// Load the stored value, or `None` if nothing was saved yet.
    async fn load(&self) -> Result<Option<T>, CheckpointError>;

    /// Replace the stored value.
    async fn save(&self, value: &T) -> Result<(), CheckpointError>;
}
