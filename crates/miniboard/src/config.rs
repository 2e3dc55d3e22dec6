//! Board configuration stored in `.miniboard/config.yaml`.
//!
//! ```yaml
//! storage:
//!   backend: jsonl
//!   data-file: .miniboard/board.jsonl
//! default-user: alice
//! page-size: 50
//! ```

use crate::commands::init::{DATA_FILE_NAME, MINIBOARD_DIR_NAME};
use crate::error::{ConfigError, Result};
use crate::storage::StorageBackend;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Page size used when the config does not set one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Backend name for the JSONL file store.
pub const BACKEND_JSONL: &str = "jsonl";

/// Backend name for the ephemeral store.
pub const BACKEND_MEMORY: &str = "memory";

/// Configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct MiniboardConfig {
    /// Storage configuration
    pub storage: StorageConfig,

    /// Username that authors issues and comments unless `MINIBOARD_USER` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_user: Option<String>,

    /// Issues per page for `list`
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Storage backend type: `jsonl` or `memory`
    pub backend: String,

    /// Path to the data file, relative to the directory holding `.miniboard`
    pub data_file: String,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl StorageConfig {
    /// Resolve the configured backend against the board's root directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unknown backend name.
    pub fn to_backend(&self, root_dir: &Path) -> Result<StorageBackend> {
        match self.backend.as_str() {
            BACKEND_JSONL => Ok(StorageBackend::Jsonl(root_dir.join(&self.data_file))),
            BACKEND_MEMORY => Ok(StorageBackend::InMemory),
            other => Err(ConfigError::Invalid(format!(
                "Unknown storage backend '{other}' (expected '{BACKEND_JSONL}' or '{BACKEND_MEMORY}')"
            ))
            .into()),
        }
    }
}

impl MiniboardConfig {
    /// Create a JSONL-backed configuration.
    #[must_use]
    pub fn new(default_user: Option<&str>) -> Self {
        Self {
            storage: StorageConfig {
                backend: BACKEND_JSONL.to_string(),
                data_file: format!("{MINIBOARD_DIR_NAME}/{DATA_FILE_NAME}"),
            },
            default_user: default_user.map(str::to_string),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or
    /// holds an invalid page size.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self = serde_yaml::from_str(&content).map_err(ConfigError::from)?;
        if config.page_size == 0 {
            return Err(ConfigError::Invalid("page-size must be at least 1".to_string()).into());
        }
        Ok(config)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(ConfigError::from)?;
        fs::write(path, content).await?;
        Ok(())
    }
}

impl Default for MiniboardConfig {
    fn default() -> Self {
        Self::new(None)
    }
}
