//! Durable key-value storage used to mirror the task collection.
//!
//! This module provides:
//! - The [`KeyValueStorage`] trait, an async string slot keyed by name
//! - An in-process [`MemoryStorage`] implementation
//! - A [`FileStorage`] implementation keeping one file per key

mod file;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Errors that can occur while reading or writing a storage slot.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("I/O error on storage key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    /// The backend refused the operation, e.g. quota exceeded
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// An asynchronous string store addressed by key.
///
/// Implementations must be shareable across tasks since writes are issued from
/// background tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Reads the value stored under `key`, or `None` when nothing was stored.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`.
    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError>;
}
