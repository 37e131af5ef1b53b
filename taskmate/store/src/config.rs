use crate::persistence::DEFAULT_STORAGE_KEY;
use crate::storage::FileStorage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of environment variables overriding configuration, e.g. `TASKMATE_DATA_DIR`.
pub const ENV_PREFIX: &str = "TASKMATE";

/// Where and under which key tasks are stored.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: default_storage_key(),
        }
    }
}

impl StoreConfig {
    /// Loads configuration from an optional TOML file, then `TASKMATE_*` environment variables.
    ///
    /// An explicitly given file must exist; without one, `taskmate.toml` in
    /// the working directory is used when present.
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("taskmate").required(false),
        };
        let settings = config::Config::builder()
            .add_source(file_source)
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// File-backed storage rooted at the configured data directory.
    pub fn file_storage(&self) -> FileStorage {
        FileStorage::new(&self.data_dir)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".taskmate")
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}
