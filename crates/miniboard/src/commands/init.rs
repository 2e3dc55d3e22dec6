//! Implementation of the `init` command.
//!
//! This module handles initialization of a new board, creating the
//! `.miniboard/` directory structure with configuration and data files.

use crate::config::MiniboardConfig;
use crate::domain::{NewUser, User, validate_username};
use crate::error::{ConfigError, Error, Result};
use crate::storage::{StorageBackend, create_storage};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the board directory
pub const MINIBOARD_DIR_NAME: &str = ".miniboard";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the board data file
pub const DATA_FILE_NAME: &str = "board.jsonl";

/// Name of the gitignore file within `.miniboard`
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Maximum directory depth to traverse when searching for the board root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

const GITIGNORE_CONTENT: &str = "\
# Leftovers from interrupted saves
*.tmp
";

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created board directory
    pub miniboard_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created data file
    pub data_file: PathBuf,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
    /// The initial user, when one was requested
    pub user: Option<User>,
}

/// Initialize a new board in the given directory.
///
/// When `username` is given it becomes the first user and the configured
/// `default-user`.
///
/// # Errors
///
/// Returns an error if:
/// - The `.miniboard/` directory already exists
/// - The username is invalid
/// - File system operations fail
pub async fn init(base_dir: &Path, username: Option<&str>) -> Result<InitResult> {
    let username = username.map(str::trim);
    if let Some(name) = username {
        validate_username(name).map_err(Error::Validation)?;
    }

    let miniboard_dir = base_dir.join(MINIBOARD_DIR_NAME);
    if fs::try_exists(&miniboard_dir).await? {
        return Err(ConfigError::AlreadyInitialized(miniboard_dir).into());
    }

    fs::create_dir_all(&miniboard_dir).await?;

    let config_file = miniboard_dir.join(CONFIG_FILE_NAME);
    MiniboardConfig::new(username).save(&config_file).await?;

    let data_file = miniboard_dir.join(DATA_FILE_NAME);
    fs::write(&data_file, "").await?;

    let gitignore_file = miniboard_dir.join(GITIGNORE_FILE_NAME);
    fs::write(&gitignore_file, GITIGNORE_CONTENT).await?;

    let user = match username {
        Some(name) => {
            let mut storage = create_storage(StorageBackend::Jsonl(data_file.clone())).await?;
            let user = storage
                .create_user(NewUser {
                    username: name.to_string(),
                })
                .await?;
            storage.save().await?;
            Some(user)
        }
        None => None,
    };

    tracing::info!(dir = %miniboard_dir.display(), "initialized board");
    Ok(InitResult {
        miniboard_dir,
        config_file,
        data_file,
        gitignore_file,
        user,
    })
}

/// Check if a directory has been initialized.
///
/// Returns `true` if the `.miniboard/` directory exists.
#[must_use]
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(MINIBOARD_DIR_NAME).exists()
}

/// Find the board root directory by searching up the directory tree.
///
/// Starts from the given directory and traverses parent directories until a
/// `.miniboard/` directory is found, the root is reached, or the maximum
/// traversal depth is exceeded.
///
/// Returns the directory *containing* `.miniboard/`.
#[must_use]
pub fn find_miniboard_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(MINIBOARD_DIR_NAME).is_dir() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
