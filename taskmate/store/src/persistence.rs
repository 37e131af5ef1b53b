//! Loads and saves the task collection through a [`KeyValueStorage`] slot.

use crate::record;
use crate::storage::{KeyValueStorage, StorageError};
use std::sync::Arc;
use taskmate_core::Task;
use thiserror::Error;
use tracing::{debug, info};

/// Storage key holding the serialized task list.
pub const DEFAULT_STORAGE_KEY: &str = "tasks";

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Cannot access stored tasks: {0}")]
    Storage(#[from] StorageError),
    #[error("Stored tasks are not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A task list mirrored into a single storage key.
pub struct TaskPersistence<S: KeyValueStorage> {
    storage: Arc<S>,
    key: String,
}

impl<S: KeyValueStorage> Clone for TaskPersistence<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            key: self.key.clone(),
        }
    }
}

impl<S: KeyValueStorage> TaskPersistence<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self::shared(Arc::new(storage), key)
    }

    /// Uses a storage handle the caller keeps a reference to.
    pub fn shared(storage: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the stored collection. A key that was never written yields an empty list.
    #[tracing::instrument(skip(self), fields(key = %self.key))]
    pub async fn load(&self) -> Result<Vec<Task>, PersistenceError> {
        let Some(payload) = self.storage.get_item(&self.key).await? else {
            debug!("No stored tasks found");
            return Ok(Vec::new());
        };
        let tasks = record::decode(&payload)?;
        info!("Loaded {} tasks", tasks.len());
        Ok(tasks)
    }

    /// Overwrites the stored collection with `tasks`.
    pub async fn save(&self, tasks: &[Task]) -> Result<(), PersistenceError> {
        let payload = record::encode(tasks)?;
        self.storage.set_item(&self.key, payload).await?;
        Ok(())
    }
}
