use super::{KeyValueStorage, StorageError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Storage keeping each key in its own `<key>.json` file under a directory.
///
/// Writes go to a uniquely named temporary file that is then renamed over the
/// target, so readers only ever see a complete snapshot.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
    write_seq: AtomicU64,
}

impl FileStorage {
    /// The directory is created lazily on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_seq: AtomicU64::new(0),
        }
    }

    /// Location of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{key}.{}.{seq}.tmp", std::process::id()))
    }
}

fn io_error(key: &str) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key)(e)),
        }
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(io_error(key))?;
        let temp_path = self.temp_path_for(key);
        tokio::fs::write(&temp_path, value)
            .await
            .map_err(io_error(key))?;
        if let Err(e) = tokio::fs::rename(&temp_path, self.path_for(key)).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(io_error(key)(e));
        }
        debug!("Wrote storage key '{}' to {}", key, self.dir.display());
        Ok(())
    }
}
