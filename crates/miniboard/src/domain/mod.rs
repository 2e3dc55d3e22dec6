//! Domain types for the board.
//!
//! Users author issues and comments, projects group issues, and releases are
//! the planning buckets whose issues are kept in a dense priority order.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of issue titles, project names and release names.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a username.
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Minimum length of a project key.
pub const MIN_KEY_LENGTH: usize = 2;

/// Maximum length of a project key.
pub const MAX_KEY_LENGTH: usize = 10;

/// Kind of record, used in errors and load warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A [`User`].
    User,
    /// A [`Project`].
    Project,
    /// A [`Release`].
    Release,
    /// An [`Issue`].
    Issue,
    /// A [`Comment`].
    Comment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "User",
            Self::Project => "Project",
            Self::Release => "Release",
            Self::Issue => "Issue",
            Self::Comment => "Comment",
        };
        f.write_str(name)
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// The kind of record this id points at.
            pub const KIND: EntityKind = EntityKind::$kind;

            /// Wrap a raw id.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// The raw numeric id.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }

            /// The error returned when this id does not resolve.
            #[must_use]
            pub fn not_found(self) -> crate::error::Error {
                crate::error::Error::NotFound {
                    kind: Self::KIND,
                    id: self.0,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a user
    UserId => User
);
entity_id!(
    /// Unique identifier for a project
    ProjectId => Project
);
entity_id!(
    /// Unique identifier for a release
    ReleaseId => Release
);
entity_id!(
    /// Unique identifier for an issue
    IssueId => Issue
);
entity_id!(
    /// Unique identifier for a comment
    CommentId => Comment
);

/// A person who can author issues and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Login name, unique across the board
    pub username: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Validate a stored user record.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        validate_username(&self.username)
    }
}

/// Data for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login name
    pub username: String,
}

/// A project groups issues under a short key (e.g. `MB`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,

    /// Short upper-case key, immutable after creation
    pub key: String,

    /// Display name
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Validate a stored project record.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        validate_project_key(&self.key)?;
        validate_title("Project name", &self.name)
    }

    /// Human-facing reference for an issue of this project, e.g. `MB-12`.
    #[must_use]
    pub fn issue_ref(&self, issue: IssueId) -> String {
        format!("{}-{}", self.key, issue)
    }
}

/// Data for creating a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    /// Short key, normalised to upper case
    pub key: String,

    /// Display name
    pub name: String,

    /// Free-form description
    pub description: String,
}

impl NewProject {
    /// Validate the new project data.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        validate_project_key(&self.key)?;
        validate_title("Project name", &self.name)
    }
}

/// Changes to an existing project. The key cannot be changed.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    /// New name (if updating)
    pub name: Option<String>,

    /// New description (if updating)
    pub description: Option<String>,
}

/// A planning bucket with a due date. Issues are ranked inside a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Unique identifier
    pub id: ReleaseId,

    /// Display name
    pub name: String,

    /// Planned delivery date
    pub due_date: NaiveDate,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Release {
    /// Validate a stored release record.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        validate_title("Release name", &self.name)
    }
}

/// Data for creating a release.
#[derive(Debug, Clone)]
pub struct NewRelease {
    /// Display name
    pub name: String,

    /// Planned delivery date
    pub due_date: NaiveDate,
}

/// Changes to an existing release.
#[derive(Debug, Clone, Default)]
pub struct ReleaseUpdate {
    /// New name (if updating)
    pub name: Option<String>,

    /// New due date (if updating)
    pub due_date: Option<NaiveDate>,
}

/// Filter for listing releases.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseFilter {
    /// Only releases due on or after this date; `None` lists every release.
    pub due_from: Option<NaiveDate>,
}

/// An issue on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier
    pub id: IssueId,

    /// Owning project
    pub project_id: ProjectId,

    /// Release the issue is planned for
    pub release_id: ReleaseId,

    /// Who created the issue
    pub author_id: UserId,

    /// Rank within the release; dense and zero-based, 0 is most urgent
    pub priority: u32,

    /// Issue type
    #[serde(rename = "type")]
    pub issue_type: IssueType,

    /// Workflow status
    pub status: IssueStatus,

    /// Estimate in story points
    #[serde(default)]
    pub points: u32,

    /// Issue title
    pub title: String,

    /// Issue description
    #[serde(default)]
    pub description: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Validate a stored issue record.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        validate_title("Title", &self.title)
    }
}

/// Kind of work an issue represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    /// Something is broken
    Bug,

    /// New functionality
    #[default]
    Feature,
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bug => f.write_str("bug"),
            Self::Feature => f.write_str("feature"),
        }
    }
}

/// Workflow status of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    /// Not started
    #[default]
    Todo,

    /// In progress
    Doing,

    /// Finished
    Done,
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Todo => f.write_str("todo"),
            Self::Doing => f.write_str("doing"),
            Self::Done => f.write_str("done"),
        }
    }
}

/// Data for creating a new issue.
///
/// Priority is not chosen by the caller: new issues go to the bottom of
/// their release.
#[derive(Debug, Clone)]
pub struct NewIssue {
    /// Owning project
    pub project_id: ProjectId,

    /// Target release
    pub release_id: ReleaseId,

    /// Author
    pub author_id: UserId,

    /// Issue type
    pub issue_type: IssueType,

    /// Estimate in story points
    pub points: u32,

    /// Issue title
    pub title: String,

    /// Issue description
    pub description: String,
}

impl NewIssue {
    /// Validate the new issue data.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        validate_title("Title", &self.title)
    }
}

/// Data for updating an existing issue.
///
/// Priority is only changed through moves; changing `release_id` appends the
/// issue to the end of the new release.
#[derive(Debug, Clone, Default)]
pub struct IssueUpdate {
    /// New title (if updating)
    pub title: Option<String>,

    /// New description (if updating)
    pub description: Option<String>,

    /// New type (if updating)
    pub issue_type: Option<IssueType>,

    /// New status (if updating)
    pub status: Option<IssueStatus>,

    /// New estimate (if updating)
    pub points: Option<u32>,

    /// New release (if updating)
    pub release_id: Option<ReleaseId>,
}

/// Filter and pagination for listing issues.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    /// Only issues of this project
    pub project_id: Option<ProjectId>,

    /// Only issues of this release
    pub release_id: Option<ReleaseId>,

    /// 1-based page number (defaults to 1)
    pub page: Option<usize>,

    /// Page size; `None` returns every match
    pub limit: Option<usize>,
}

/// One page of issues plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuePage {
    /// Issues on this page
    pub issues: Vec<Issue>,

    /// Total matches across all pages
    pub total: usize,
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier
    pub id: CommentId,

    /// Issue the comment belongs to
    pub issue_id: IssueId,

    /// Author
    pub author_id: UserId,

    /// Comment body
    pub content: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Validate a stored comment record.
    ///
    /// # Errors
    ///
    /// Returns a message if the content is blank.
    pub fn validate(&self) -> Result<(), String> {
        validate_comment(&self.content)
    }
}

/// Data for creating a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    /// Issue to comment on
    pub issue_id: IssueId,

    /// Author
    pub author_id: UserId,

    /// Comment body
    pub content: String,
}

/// Check a title-like field: non-blank, single line, bounded length.
///
/// # Errors
///
/// Returns a message naming `field` when the value is invalid.
pub fn validate_title(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    if value.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!(
            "{field} cannot exceed {MAX_TITLE_LENGTH} characters"
        ));
    }
    if value.contains(['\n', '\r']) {
        return Err(format!("{field} cannot contain newline characters"));
    }
    Ok(())
}

/// Check a username: 1 to 50 characters without whitespace.
///
/// # Errors
///
/// Returns a message describing the problem.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(format!(
            "Username cannot exceed {MAX_USERNAME_LENGTH} characters"
        ));
    }
    if username.chars().any(char::is_whitespace) {
        return Err("Username cannot contain whitespace".to_string());
    }
    Ok(())
}

/// Check a project key: 2 to 10 ASCII alphanumerics.
///
/// # Errors
///
/// Returns a message describing the problem.
pub fn validate_project_key(key: &str) -> Result<(), String> {
    if key.len() < MIN_KEY_LENGTH || key.len() > MAX_KEY_LENGTH {
        return Err(format!(
            "Project key must be {MIN_KEY_LENGTH}-{MAX_KEY_LENGTH} characters"
        ));
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Project key must contain only alphanumeric characters".to_string());
    }
    Ok(())
}

/// Check a comment body is not blank.
///
/// # Errors
///
/// Returns a message if the content is blank.
pub fn validate_comment(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Comment cannot be empty".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn ids_parse_and_display() {
        let id: IssueId = " 42 ".parse().unwrap();
        assert_eq!(id, IssueId::new(42));
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<IssueId>().is_err());
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&ReleaseId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn not_found_names_the_kind() {
        let err = ProjectId::new(3).not_found();
        assert_eq!(err.to_string(), "Project not found: 3");
    }

    #[rstest]
    #[case("", false)]
    #[case("   ", false)]
    #[case("Fix login", true)]
    #[case("two\nlines", false)]
    fn title_validation(#[case] title: &str, #[case] ok: bool) {
        assert_eq!(validate_title("Title", title).is_ok(), ok);
    }

    #[test]
    fn title_length_counts_characters() {
        let at_limit = "é".repeat(MAX_TITLE_LENGTH);
        assert!(validate_title("Title", &at_limit).is_ok());
        assert!(validate_title("Title", &format!("{at_limit}x")).is_err());
    }

    #[rstest]
    #[case("MB", true)]
    #[case("PROJ42", true)]
    #[case("M", false)]
    #[case("WAYTOOLONGKEY", false)]
    #[case("M-B", false)]
    fn project_key_validation(#[case] key: &str, #[case] ok: bool) {
        assert_eq!(validate_project_key(key).is_ok(), ok);
    }

    #[rstest]
    #[case("alice", true)]
    #[case("", false)]
    #[case("alice smith", false)]
    fn username_validation(#[case] name: &str, #[case] ok: bool) {
        assert_eq!(validate_username(name).is_ok(), ok);
    }

    #[test]
    fn issue_serializes_type_field() {
        let now = Utc::now();
        let issue = Issue {
            id: IssueId::new(1),
            project_id: ProjectId::new(1),
            release_id: ReleaseId::new(1),
            author_id: UserId::new(1),
            priority: 0,
            issue_type: IssueType::Bug,
            status: IssueStatus::Doing,
            points: 3,
            title: "Crash".to_string(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["type"], "bug");
        assert_eq!(value["status"], "doing");
        assert_eq!(value["release_id"], 1);
    }

    #[test]
    fn issue_ref_uses_project_key() {
        let project = Project {
            id: ProjectId::new(1),
            key: "MB".to_string(),
            name: "Mini Board".to_string(),
            description: String::new(),
            created_at: Utc::now(),
        };
        assert_eq!(project.issue_ref(IssueId::new(12)), "MB-12");
    }
}
