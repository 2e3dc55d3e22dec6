//! Storage abstraction layer for the board.
//!
//! This module provides the core storage trait and factory for creating
//! storage backends:
//!
//! - **In-memory**: ephemeral storage backed by ordered maps
//! - **JSONL**: the in-memory store loaded from and saved to one JSON Lines file
//!
//! # Architecture
//!
//! The trait is async and object-safe, so callers hold a
//! `Box<dyn BoardStorage>` and never depend on the backend. Every method of
//! the in-memory implementation runs under a single lock acquisition, which
//! makes [`BoardStorage::move_issue`] a transaction: the issues it reads are
//! the issues it rewrites.
//!
//! # Example
//!
//! ```no_run
//! use miniboard::domain::{IssueType, NewIssue, NewProject, NewRelease, NewUser};
//! use miniboard::storage::{BoardStorage, StorageBackend, create_storage};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut storage = create_storage(StorageBackend::InMemory).await?;
//!
//!     let user = storage.create_user(NewUser { username: "alice".into() }).await?;
//!     let project = storage
//!         .create_project(NewProject {
//!             key: "MB".into(),
//!             name: "Mini Board".into(),
//!             description: String::new(),
//!         })
//!         .await?;
//!     let release = storage
//!         .create_release(NewRelease {
//!             name: "1.0".into(),
//!             due_date: chrono::NaiveDate::from_ymd_opt(2030, 1, 31).unwrap(),
//!         })
//!         .await?;
//!
//!     let first = storage
//!         .create_issue(NewIssue {
//!             project_id: project.id,
//!             release_id: release.id,
//!             author_id: user.id,
//!             issue_type: IssueType::Feature,
//!             points: 3,
//!             title: "Drag and drop".into(),
//!             description: String::new(),
//!         })
//!         .await?;
//!     assert_eq!(first.priority, 0);
//!
//!     storage.save().await?;
//!     Ok(())
//! }
//! ```

pub mod in_memory;

use crate::domain::{
    Comment, CommentId, Issue, IssueFilter, IssueId, IssuePage, IssueUpdate, NewComment,
    NewIssue, NewProject, NewRelease, NewUser, Project, ProjectId, ProjectUpdate, Release,
    ReleaseFilter, ReleaseId, ReleaseUpdate, User, UserId,
};
use crate::error::Result;
use crate::reorder::PriorityUpdate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Core storage trait for board records.
///
/// All implementations must be `Send + Sync` for use in async contexts.
/// Lookups return `Ok(None)` for unknown ids; mutations return
/// [`Error::NotFound`](crate::error::Error::NotFound) instead. Every mutation
/// keeps priorities dense in each release it touches.
#[async_trait]
pub trait BoardStorage: Send + Sync {
    /// Create a user. Usernames are unique.
    async fn create_user(&mut self, user: NewUser) -> Result<User>;

    /// Get a user by id.
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Get a user by username.
    async fn find_user_by_name(&self, username: &str) -> Result<Option<User>>;

    /// All users, ordered by username.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Create a project. The key is upper-cased and must be unique.
    async fn create_project(&mut self, project: NewProject) -> Result<Project>;

    /// Get a project by id.
    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>>;

    /// Get a project by key, ignoring case.
    async fn find_project_by_key(&self, key: &str) -> Result<Option<Project>>;

    /// All projects, ordered by name.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Change a project's name or description.
    async fn update_project(&mut self, id: ProjectId, update: ProjectUpdate) -> Result<Project>;

    /// Delete a project together with its issues and their comments.
    ///
    /// Releases that lose issues are compacted.
    async fn delete_project(&mut self, id: ProjectId) -> Result<()>;

    /// Create a release.
    async fn create_release(&mut self, release: NewRelease) -> Result<Release>;

    /// Get a release by id.
    async fn get_release(&self, id: ReleaseId) -> Result<Option<Release>>;

    /// Releases matching `filter`, latest due date first.
    async fn list_releases(&self, filter: &ReleaseFilter) -> Result<Vec<Release>>;

    /// Change a release's name or due date.
    async fn update_release(&mut self, id: ReleaseId, update: ReleaseUpdate) -> Result<Release>;

    /// Delete a release together with its issues and their comments.
    async fn delete_release(&mut self, id: ReleaseId) -> Result<()>;

    /// Create an issue at the bottom of its release with status `todo`.
    ///
    /// The project, release and author must exist.
    async fn create_issue(&mut self, issue: NewIssue) -> Result<Issue>;

    /// Get an issue by id.
    async fn get_issue(&self, id: IssueId) -> Result<Option<Issue>>;

    /// Update an issue.
    ///
    /// Changing the release appends the issue to the new release and compacts
    /// the old one.
    async fn update_issue(&mut self, id: IssueId, update: IssueUpdate) -> Result<Issue>;

    /// Delete an issue and its comments, compacting its release.
    async fn delete_issue(&mut self, id: IssueId) -> Result<()>;

    /// Issues matching `filter`, ordered by release due date (latest first)
    /// then priority, one page at a time.
    async fn list_issues(&self, filter: &IssueFilter) -> Result<IssuePage>;

    /// Move `source` to the position of `target`, possibly across releases.
    ///
    /// Returns the updates that were applied. Unknown ids and self-moves are
    /// no-ops that return an empty list.
    async fn move_issue(&mut self, source: IssueId, target: IssueId)
    -> Result<Vec<PriorityUpdate>>;

    /// Comment on an issue. The issue and author must exist.
    async fn add_comment(&mut self, comment: NewComment) -> Result<Comment>;

    /// Comments on an issue, oldest first.
    async fn list_comments(&self, issue_id: IssueId) -> Result<Vec<Comment>>;

    /// Delete a comment.
    async fn delete_comment(&mut self, id: CommentId) -> Result<()>;

    /// Replace the whole board with `snapshot`.
    ///
    /// The snapshot must be consistent: unique ids, resolvable references and
    /// dense priorities.
    async fn import(&mut self, snapshot: Snapshot) -> Result<()>;

    /// Copy of every record, each kind sorted by id.
    async fn export_all(&self) -> Result<Snapshot>;

    /// Save any pending changes to persistent storage.
    ///
    /// For in-memory storage this is a no-op. For JSONL storage this writes
    /// the board to the file atomically.
    async fn save(&self) -> Result<()>;

    /// Discard in-memory state and load it again from persistent storage.
    ///
    /// For in-memory storage this is a no-op.
    async fn reload(&mut self) -> Result<()>;
}

/// Every record of a board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// All users
    pub users: Vec<User>,
    /// All projects
    pub projects: Vec<Project>,
    /// All releases
    pub releases: Vec<Release>,
    /// All issues
    pub issues: Vec<Issue>,
    /// All comments
    pub comments: Vec<Comment>,
}

impl Snapshot {
    /// Flatten into tagged records, users first and comments last.
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        let mut records = Vec::with_capacity(
            self.users.len()
                + self.projects.len()
                + self.releases.len()
                + self.issues.len()
                + self.comments.len(),
        );
        records.extend(self.users.into_iter().map(Record::User));
        records.extend(self.projects.into_iter().map(Record::Project));
        records.extend(self.releases.into_iter().map(Record::Release));
        records.extend(self.issues.into_iter().map(Record::Issue));
        records.extend(self.comments.into_iter().map(Record::Comment));
        records
    }

    /// Gather tagged records back into a snapshot, keeping their order.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut snapshot = Self::default();
        for record in records {
            match record {
                Record::User(user) => snapshot.users.push(user),
                Record::Project(project) => snapshot.projects.push(project),
                Record::Release(release) => snapshot.releases.push(release),
                Record::Issue(issue) => snapshot.issues.push(issue),
                Record::Comment(comment) => snapshot.comments.push(comment),
            }
        }
        snapshot
    }
}

/// One line of the data file: a record tagged with its kind.
///
/// ```
/// use miniboard::storage::Record;
///
/// let line = r#"{"kind":"user","id":1,"username":"alice","created_at":"2024-01-01T00:00:00Z"}"#;
/// let record: Record = serde_json::from_str(line).unwrap();
/// assert!(matches!(record, Record::User(user) if user.username == "alice"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    /// A user
    User(User),
    /// A project
    Project(Project),
    /// A release
    Release(Release),
    /// An issue
    Issue(Issue),
    /// A comment
    Comment(Comment),
}

/// Storage backend type
///
/// Determines which storage implementation to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// JSONL file storage (persistent)
    Jsonl(PathBuf),
}

impl StorageBackend {
    /// Returns the data file path for file-based backends.
    #[must_use]
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            StorageBackend::Jsonl(path) => Some(path),
            StorageBackend::InMemory => None,
        }
    }
}

/// Wrapper that adds JSONL file persistence to any storage backend.
///
/// Holds the file path and implements `save()` by writing every record to
/// the file atomically.
struct JsonlBackedStorage {
    inner: Box<dyn BoardStorage>,
    path: PathBuf,
}

#[async_trait]
impl BoardStorage for JsonlBackedStorage {
    async fn create_user(&mut self, user: NewUser) -> Result<User> {
        self.inner.create_user(user).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.inner.get_user(id).await
    }

    async fn find_user_by_name(&self, username: &str) -> Result<Option<User>> {
        self.inner.find_user_by_name(username).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.inner.list_users().await
    }

    async fn create_project(&mut self, project: NewProject) -> Result<Project> {
        self.inner.create_project(project).await
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>> {
        self.inner.get_project(id).await
    }

    async fn find_project_by_key(&self, key: &str) -> Result<Option<Project>> {
        self.inner.find_project_by_key(key).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.inner.list_projects().await
    }

    async fn update_project(&mut self, id: ProjectId, update: ProjectUpdate) -> Result<Project> {
        self.inner.update_project(id, update).await
    }

    async fn delete_project(&mut self, id: ProjectId) -> Result<()> {
        self.inner.delete_project(id).await
    }

    async fn create_release(&mut self, release: NewRelease) -> Result<Release> {
        self.inner.create_release(release).await
    }

    async fn get_release(&self, id: ReleaseId) -> Result<Option<Release>> {
        self.inner.get_release(id).await
    }

    async fn list_releases(&self, filter: &ReleaseFilter) -> Result<Vec<Release>> {
        self.inner.list_releases(filter).await
    }

    async fn update_release(&mut self, id: ReleaseId, update: ReleaseUpdate) -> Result<Release> {
        self.inner.update_release(id, update).await
    }

    async fn delete_release(&mut self, id: ReleaseId) -> Result<()> {
        self.inner.delete_release(id).await
    }

    async fn create_issue(&mut self, issue: NewIssue) -> Result<Issue> {
        self.inner.create_issue(issue).await
    }

    async fn get_issue(&self, id: IssueId) -> Result<Option<Issue>> {
        self.inner.get_issue(id).await
    }

    async fn update_issue(&mut self, id: IssueId, update: IssueUpdate) -> Result<Issue> {
        self.inner.update_issue(id, update).await
    }

    async fn delete_issue(&mut self, id: IssueId) -> Result<()> {
        self.inner.delete_issue(id).await
    }

    async fn list_issues(&self, filter: &IssueFilter) -> Result<IssuePage> {
        self.inner.list_issues(filter).await
    }

    async fn move_issue(
        &mut self,
        source: IssueId,
        target: IssueId,
    ) -> Result<Vec<PriorityUpdate>> {
        self.inner.move_issue(source, target).await
    }

    async fn add_comment(&mut self, comment: NewComment) -> Result<Comment> {
        self.inner.add_comment(comment).await
    }

    async fn list_comments(&self, issue_id: IssueId) -> Result<Vec<Comment>> {
        self.inner.list_comments(issue_id).await
    }

    async fn delete_comment(&mut self, id: CommentId) -> Result<()> {
        self.inner.delete_comment(id).await
    }

    async fn import(&mut self, snapshot: Snapshot) -> Result<()> {
        self.inner.import(snapshot).await
    }

    async fn export_all(&self) -> Result<Snapshot> {
        self.inner.export_all().await
    }

    async fn save(&self) -> Result<()> {
        in_memory::save_to_jsonl(self.inner.as_ref(), &self.path).await
    }

    async fn reload(&mut self) -> Result<()> {
        self.inner = load_or_empty(&self.path, "JSONL reload warning").await?;
        Ok(())
    }
}

/// Load the data file, or start empty when it does not exist yet.
async fn load_or_empty(path: &Path, context: &'static str) -> Result<Box<dyn BoardStorage>> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(in_memory::new_in_memory_storage());
    }

    let (storage, warnings) = in_memory::load_from_jsonl(path).await?;
    // The store is still usable; surface what was skipped or repaired.
    for warning in &warnings {
        tracing::warn!(%warning, kind = warning.kind(), "{context}");
    }
    Ok(storage)
}

/// Create a storage instance for the given backend.
///
/// This factory function returns a trait object that can be used
/// polymorphically regardless of the backend implementation.
///
/// # Errors
///
/// - `Error::Io` if the data file exists but cannot be opened
/// - `Error::Storage` if its records cannot be assembled into a board
pub async fn create_storage(backend: StorageBackend) -> Result<Box<dyn BoardStorage>> {
    match backend {
        StorageBackend::InMemory => Ok(in_memory::new_in_memory_storage()),
        StorageBackend::Jsonl(path) => {
            let inner = load_or_empty(&path, "JSONL load warning").await?;
            Ok(Box::new(JsonlBackedStorage { inner, path }))
        }
    }
}
