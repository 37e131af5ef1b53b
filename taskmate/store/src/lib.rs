//! Persistent task store for Taskmate.
//!
//! Owns the in-memory task collection and mirrors it into durable key-value
//! storage.
pub mod config;
pub mod persistence;
pub mod record;
pub mod storage;
pub mod store;

pub use config::StoreConfig;
pub use persistence::{DEFAULT_STORAGE_KEY, PersistenceError, TaskPersistence};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::TaskStore;
