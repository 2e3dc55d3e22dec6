//! Application context for CLI command execution.
//!
//! This module provides the `App` struct that manages storage lifecycle
//! and provides a context for executing CLI commands.
//!
//! # Example
//!
//! ```no_run
//! use miniboard::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let author = app.acting_user().await?;
//!     println!("working as {}", author.username);
//!     Ok(())
//! }
//! ```

use crate::commands::init::{CONFIG_FILE_NAME, MINIBOARD_DIR_NAME, find_miniboard_root};
use crate::config::MiniboardConfig;
use crate::domain::{IssueId, Project, ProjectId, User};
use crate::error::{ConfigError, Error, Result};
use crate::reorder::PriorityUpdate;
use crate::storage::{BoardStorage, create_storage};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured `default-user`.
pub const USER_ENV_VAR: &str = "MINIBOARD_USER";

/// Application context for CLI operations.
///
/// Manages storage initialization and lifecycle, and provides the execution
/// context for CLI commands. Storage is loaded from the board directory on
/// creation.
pub struct App {
    /// The storage backend (trait object for polymorphism)
    storage: Box<dyn BoardStorage>,

    /// Path to the board directory (.miniboard)
    miniboard_dir: PathBuf,

    /// Loaded configuration
    config: MiniboardConfig,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("miniboard_dir", &self.miniboard_dir)
            .field("config", &self.config)
            .field("storage", &"<dyn BoardStorage>")
            .finish()
    }
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree to find a `.miniboard/` directory,
    /// loads configuration, and initializes storage.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No board is found in the directory tree
    /// - Configuration cannot be loaded
    /// - Storage initialization fails
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_miniboard_root(working_dir).ok_or(ConfigError::NotInitialized)?;

        let miniboard_dir = root_dir.join(MINIBOARD_DIR_NAME);
        let config = MiniboardConfig::load(&miniboard_dir.join(CONFIG_FILE_NAME)).await?;

        let backend = config.storage.to_backend(&root_dir)?;
        tracing::debug!(?backend, "opening board");
        let storage = create_storage(backend).await?;

        Ok(Self {
            storage,
            miniboard_dir,
            config,
        })
    }

    /// Get a mutable reference to the storage.
    pub fn storage_mut(&mut self) -> &mut dyn BoardStorage {
        self.storage.as_mut()
    }

    /// Get an immutable reference to the storage.
    #[must_use]
    pub fn storage(&self) -> &dyn BoardStorage {
        self.storage.as_ref()
    }

    /// Get the loaded configuration.
    #[must_use]
    pub fn config(&self) -> &MiniboardConfig {
        &self.config
    }

    /// Get the path to the board directory.
    #[must_use]
    pub fn miniboard_dir(&self) -> &Path {
        &self.miniboard_dir
    }

    /// The user that authors new issues and comments.
    ///
    /// `MINIBOARD_USER` wins over the configured `default-user`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no user is configured or the named
    /// user does not exist.
    pub async fn acting_user(&self) -> Result<User> {
        let from_env = std::env::var(USER_ENV_VAR).ok();
        self.resolve_user(from_env.as_deref()).await
    }

    /// Resolve the acting user, preferring `override_name` when non-empty.
    ///
    /// # Errors
    ///
    /// See [`App::acting_user`].
    pub async fn resolve_user(&self, override_name: Option<&str>) -> Result<User> {
        let name = override_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or(self.config.default_user.as_deref())
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "No acting user: set default-user in {MINIBOARD_DIR_NAME}/{CONFIG_FILE_NAME} or {USER_ENV_VAR}"
                ))
            })?;

        self.storage.find_user_by_name(name).await?.ok_or_else(|| {
            ConfigError::Invalid(format!(
                "Unknown user '{name}' (create it with `miniboard user add {name}`)"
            ))
            .into()
        })
    }

    /// Look up a project by numeric id or by key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] or a validation error for an unknown key.
    pub async fn find_project(&self, reference: &str) -> Result<Project> {
        let reference = reference.trim();
        if let Ok(id) = reference.parse::<ProjectId>() {
            return self
                .storage
                .get_project(id)
                .await?
                .ok_or_else(|| id.not_found());
        }
        self.storage
            .find_project_by_key(reference)
            .await?
            .ok_or_else(|| Error::Validation(format!("No project with key '{reference}'")))
    }

    /// Move `source` onto `target` and persist the result.
    ///
    /// Nothing is written when the move changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails; unknown ids are a no-op.
    pub async fn move_issue(
        &mut self,
        source: IssueId,
        target: IssueId,
    ) -> Result<Vec<PriorityUpdate>> {
        let updates = self.storage.move_issue(source, target).await?;
        if updates.is_empty() {
            tracing::debug!(%source, %target, "move changed nothing");
        } else {
            tracing::info!(%source, %target, changed = updates.len(), "moved issue");
            self.save().await?;
        }
        Ok(updates)
    }

    /// Save storage state to persistent storage.
    ///
    /// This should be called after any mutating operations.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file cannot be written.
    pub async fn save(&self) -> Result<()> {
        self.storage.save().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init;
    use crate::domain::{IssueType, NewIssue, NewProject, NewRelease, NewUser};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    async fn initialized(user: Option<&str>) -> (TempDir, App) {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path(), user).await.unwrap();
        let app = App::from_directory(temp_dir.path()).await.unwrap();
        (temp_dir, app)
    }

    #[tokio::test]
    async fn app_from_initialized_directory() {
        let (_dir, app) = initialized(Some("alice")).await;

        assert!(app.miniboard_dir().ends_with(".miniboard"));
        assert_eq!(app.config().default_user.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn app_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path(), None).await.unwrap();
        let sub_dir = temp_dir.path().join("src").join("lib");
        std::fs::create_dir_all(&sub_dir).unwrap();

        let app = App::from_directory(&sub_dir).await.unwrap();
        assert_eq!(app.miniboard_dir(), temp_dir.path().join(".miniboard"));
    }

    #[tokio::test]
    async fn app_from_uninitialized_directory() {
        let temp_dir = TempDir::new().unwrap();

        let err = App::from_directory(temp_dir.path()).await.unwrap_err();
        assert!(err.to_string().contains(".miniboard not found"));
    }

    #[tokio::test]
    async fn resolve_user_prefers_override() {
        let (_dir, mut app) = initialized(Some("alice")).await;
        app.storage_mut()
            .create_user(NewUser {
                username: "bob".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(app.resolve_user(None).await.unwrap().username, "alice");
        assert_eq!(app.resolve_user(Some("bob")).await.unwrap().username, "bob");
        assert_eq!(app.resolve_user(Some("  ")).await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn resolve_user_without_configuration_fails() {
        let (_dir, app) = initialized(None).await;

        let err = app.resolve_user(None).await.unwrap_err();
        assert!(err.to_string().contains("No acting user"));
    }

    #[tokio::test]
    async fn resolve_unknown_user_fails() {
        let (_dir, app) = initialized(Some("alice")).await;

        let err = app.resolve_user(Some("carol")).await.unwrap_err();
        assert!(err.to_string().contains("Unknown user 'carol'"));
    }

    #[tokio::test]
    async fn find_project_by_id_or_key() {
        let (_dir, mut app) = initialized(None).await;
        let project = app
            .storage_mut()
            .create_project(NewProject {
                key: "MB".to_string(),
                name: "Mini Board".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();

        assert_eq!(app.find_project("1").await.unwrap().id, project.id);
        assert_eq!(app.find_project("mb").await.unwrap().id, project.id);
        assert!(matches!(
            app.find_project("99").await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            app.find_project("XX").await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn move_issue_persists_changes() {
        let (dir, mut app) = initialized(Some("alice")).await;
        let author = app.resolve_user(None).await.unwrap();
        let storage = app.storage_mut();
        let project = storage
            .create_project(NewProject {
                key: "MB".to_string(),
                name: "Mini Board".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        let release = storage
            .create_release(NewRelease {
                name: "1.0".to_string(),
                due_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            })
            .await
            .unwrap();
        let mut ids = Vec::new();
        for title in ["first", "second"] {
            let issue = storage
                .create_issue(NewIssue {
                    project_id: project.id,
                    release_id: release.id,
                    author_id: author.id,
                    issue_type: IssueType::Feature,
                    points: 1,
                    title: title.to_string(),
                    description: String::new(),
                })
                .await
                .unwrap();
            ids.push(issue.id);
        }

        let updates = app.move_issue(ids[1], ids[0]).await.unwrap();
        assert_eq!(updates.len(), 2);

        let reopened = App::from_directory(dir.path()).await.unwrap();
        let moved = reopened.storage().get_issue(ids[1]).await.unwrap().unwrap();
        assert_eq!(moved.priority, 0);
    }

    #[tokio::test]
    async fn move_unknown_issue_is_a_no_op() {
        let (_dir, mut app) = initialized(None).await;

        let updates = app
            .move_issue(IssueId::new(1), IssueId::new(2))
            .await
            .unwrap();
        assert!(updates.is_empty());
    }
}
