//! JSONL persistence for in-memory storage.
//!
//! The data file holds one tagged record per line, users first and comments
//! last. Loading never fails on bad content: unusable lines and records are
//! dropped with a [`LoadWarning`], and releases whose priorities are not
//! dense are renumbered.

use super::inner::BoardInner;
use crate::domain::{EntityKind, Issue, ReleaseId};
use crate::error::{Result, StorageError};
use crate::reorder::{self, Ranked};
use crate::storage::{BoardStorage, Record, Snapshot};
use miniboard_jsonl::{Warning as JsonlWarning, read_jsonl_resilient, write_jsonl_atomic_iter};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Names one record of the data file, e.g. `Issue 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordRef {
    /// Kind of record
    pub kind: EntityKind,
    /// Its id
    pub id: u64,
}

impl RecordRef {
    fn new(kind: EntityKind, id: impl Into<u64>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Warnings that can occur during JSONL file loading.
///
/// These are non-fatal: loading continues, but the affected data is skipped
/// or repaired. Applications should report them, as they point at data that
/// may need manual attention.
///
/// ```no_run
/// # use miniboard::storage::in_memory::{load_from_jsonl, LoadWarning};
/// # use std::path::Path;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> anyhow::Result<()> {
/// let (_storage, warnings) = load_from_jsonl(Path::new(".miniboard/board.jsonl")).await?;
///
/// for warning in warnings {
///     if let LoadWarning::PriorityRepaired { release_id } = warning {
///         eprintln!("renumbered release {release_id}");
///     } else {
///         eprintln!("{warning}");
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A line that is not a valid record.
    ///
    /// **Effect**: the line is skipped.
    /// **Common causes**: manual editing, incomplete writes, invalid UTF-8.
    MalformedJson {
        /// 1-based line number
        line_number: usize,
        /// Decoder message
        error: String,
    },

    /// Reading stopped early on an I/O error.
    ///
    /// **Effect**: everything from this line on is missing.
    ReadStopped {
        /// 1-based line number where reading stopped
        line_number: usize,
        /// The I/O error
        reason: String,
    },

    /// A record failed validation, or reuses a username or project key.
    ///
    /// **Effect**: the record is skipped.
    InvalidRecord {
        /// The skipped record
        record: RecordRef,
        /// Why it was rejected
        error: String,
    },

    /// An issue or comment points at a record that does not exist.
    ///
    /// **Effect**: the record is skipped. Comments on a skipped issue are
    /// skipped too.
    DanglingReference {
        /// The skipped record
        record: RecordRef,
        /// The record it referred to
        missing: RecordRef,
    },

    /// A second record with an id already seen.
    ///
    /// **Effect**: the later record is skipped; the first one wins.
    DuplicateId {
        /// The skipped record
        record: RecordRef,
    },

    /// A release's priorities were not exactly `0..n-1`.
    ///
    /// **Effect**: the release is renumbered keeping its order.
    /// **Common causes**: data written with 1-based priorities, manual edits.
    PriorityRepaired {
        /// The renumbered release
        release_id: ReleaseId,
    },
}

impl LoadWarning {
    /// Short identifier of the warning kind, for structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::ReadStopped { .. } => "read_stopped",
            Self::InvalidRecord { .. } => "invalid_record",
            Self::DanglingReference { .. } => "dangling_reference",
            Self::DuplicateId { .. } => "duplicate_id",
            Self::PriorityRepaired { .. } => "priority_repaired",
        }
    }
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: skipped malformed record: {error}")
            }
            Self::ReadStopped {
                line_number,
                reason,
            } => write!(f, "line {line_number}: stopped reading: {reason}"),
            Self::InvalidRecord { record, error } => {
                write!(f, "skipped invalid {record}: {error}")
            }
            Self::DanglingReference { record, missing } => {
                write!(f, "skipped {record}: {missing} does not exist")
            }
            Self::DuplicateId { record } => write!(f, "skipped duplicate {record}"),
            Self::PriorityRepaired { release_id } => {
                write!(f, "renumbered priorities of release {release_id}")
            }
        }
    }
}

impl From<JsonlWarning> for LoadWarning {
    fn from(warning: JsonlWarning) -> Self {
        match warning {
            JsonlWarning::MalformedJson { line_number, error } => {
                Self::MalformedJson { line_number, error }
            }
            JsonlWarning::InvalidUtf8 { line_number } => Self::MalformedJson {
                line_number,
                error: "invalid UTF-8".to_string(),
            },
            JsonlWarning::SkippedLine {
                line_number,
                reason,
            } => Self::ReadStopped {
                line_number,
                reason,
            },
        }
    }
}

/// Load storage from a JSONL file.
///
/// Records are checked in dependency order: users, projects and releases
/// first, then issues against them, then comments against the surviving
/// issues. Priorities are repaired last.
///
/// # Errors
///
/// Fails only if the file cannot be opened. Everything wrong inside it is
/// reported in the returned warnings.
pub async fn load_from_jsonl(path: &Path) -> Result<(Box<dyn BoardStorage>, Vec<LoadWarning>)> {
    let (records, jsonl_warnings) = read_jsonl_resilient::<Record, _>(path)
        .await
        .map_err(StorageError::from)?;

    let mut warnings: Vec<LoadWarning> = jsonl_warnings.into_iter().map(Into::into).collect();
    let snapshot = sanitize(Snapshot::from_records(records), &mut warnings);
    let board = BoardInner::from_snapshot(snapshot)?;

    tracing::debug!(
        path = %path.display(),
        issues = board.issues.len(),
        warnings = warnings.len(),
        "loaded board"
    );
    Ok((Box::new(Arc::new(Mutex::new(board))), warnings))
}

/// Save storage to a JSONL file, replacing it atomically.
///
/// # Errors
///
/// Returns an error if the records cannot be exported or the file cannot be
/// written. The previous file is left intact on failure.
pub async fn save_to_jsonl(storage: &dyn BoardStorage, path: &Path) -> Result<()> {
    let records = storage.export_all().await?.into_records();
    let count = records.len();

    write_jsonl_atomic_iter(path, records)
        .await
        .map_err(StorageError::from)?;

    tracing::info!(path = %path.display(), records = count, "saved board");
    Ok(())
}

/// Drop records that fail validation or repeat an id; the first wins.
fn keep_valid<T>(
    kind: EntityKind,
    records: Vec<T>,
    id: impl Fn(&T) -> u64,
    validate: impl Fn(&T) -> std::result::Result<(), String>,
    warnings: &mut Vec<LoadWarning>,
) -> Vec<T> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| {
            let reference = RecordRef::new(kind, id(record));
            if let Err(error) = validate(record) {
                warnings.push(LoadWarning::InvalidRecord {
                    record: reference,
                    error,
                });
                return false;
            }
            if !seen.insert(reference.id) {
                warnings.push(LoadWarning::DuplicateId { record: reference });
                return false;
            }
            true
        })
        .collect()
}

/// Turn whatever was read into a snapshot the store accepts.
fn sanitize(snapshot: Snapshot, warnings: &mut Vec<LoadWarning>) -> Snapshot {
    let mut users = keep_valid(
        EntityKind::User,
        snapshot.users,
        |u| u.id.get(),
        crate::domain::User::validate,
        warnings,
    );
    let mut usernames = HashSet::new();
    users.retain(|user| {
        let fresh = usernames.insert(user.username.clone());
        if !fresh {
            warnings.push(LoadWarning::InvalidRecord {
                record: RecordRef::new(EntityKind::User, user.id),
                error: format!("username '{}' is already taken", user.username),
            });
        }
        fresh
    });

    let mut projects = keep_valid(
        EntityKind::Project,
        snapshot.projects,
        |p| p.id.get(),
        crate::domain::Project::validate,
        warnings,
    );
    let mut keys = HashSet::new();
    projects.retain(|project| {
        let fresh = keys.insert(project.key.to_ascii_uppercase());
        if !fresh {
            warnings.push(LoadWarning::InvalidRecord {
                record: RecordRef::new(EntityKind::Project, project.id),
                error: format!("project key '{}' is already in use", project.key),
            });
        }
        fresh
    });

    let releases = keep_valid(
        EntityKind::Release,
        snapshot.releases,
        |r| r.id.get(),
        crate::domain::Release::validate,
        warnings,
    );

    let user_ids: HashSet<_> = users.iter().map(|u| u.id).collect();
    let project_ids: HashSet<_> = projects.iter().map(|p| p.id).collect();
    let release_ids: HashSet<_> = releases.iter().map(|r| r.id).collect();

    let mut issues = keep_valid(
        EntityKind::Issue,
        snapshot.issues,
        |i| i.id.get(),
        Issue::validate,
        warnings,
    );
    issues.retain(|issue| {
        let missing = if !project_ids.contains(&issue.project_id) {
            Some(RecordRef::new(EntityKind::Project, issue.project_id))
        } else if !release_ids.contains(&issue.release_id) {
            Some(RecordRef::new(EntityKind::Release, issue.release_id))
        } else if !user_ids.contains(&issue.author_id) {
            Some(RecordRef::new(EntityKind::User, issue.author_id))
        } else {
            None
        };
        report_dangling(RecordRef::new(EntityKind::Issue, issue.id), missing, warnings)
    });

    let issue_ids: HashSet<_> = issues.iter().map(|i| i.id).collect();
    let mut comments = keep_valid(
        EntityKind::Comment,
        snapshot.comments,
        |c| c.id.get(),
        crate::domain::Comment::validate,
        warnings,
    );
    comments.retain(|comment| {
        let missing = if !issue_ids.contains(&comment.issue_id) {
            Some(RecordRef::new(EntityKind::Issue, comment.issue_id))
        } else if !user_ids.contains(&comment.author_id) {
            Some(RecordRef::new(EntityKind::User, comment.author_id))
        } else {
            None
        };
        report_dangling(
            RecordRef::new(EntityKind::Comment, comment.id),
            missing,
            warnings,
        )
    });

    repair_priorities(&mut issues, warnings);

    Snapshot {
        users,
        projects,
        releases,
        issues,
        comments,
    }
}

/// Record a dangling reference; returns whether the record is kept.
fn report_dangling(
    record: RecordRef,
    missing: Option<RecordRef>,
    warnings: &mut Vec<LoadWarning>,
) -> bool {
    match missing {
        Some(missing) => {
            warnings.push(LoadWarning::DanglingReference { record, missing });
            false
        }
        None => true,
    }
}

/// Renumber every release whose priorities have gaps or repeats.
fn repair_priorities(issues: &mut [Issue], warnings: &mut Vec<LoadWarning>) {
    if reorder::verify_density(issues).is_ok() {
        return;
    }

    let releases: BTreeSet<ReleaseId> = issues.iter().map(Ranked::release_id).collect();
    for release_id in releases {
        let updates = reorder::compact(issues, release_id);
        if !updates.is_empty() {
            reorder::apply_updates(issues, &updates);
            warnings.push(LoadWarning::PriorityRepaired { release_id });
        }
    }
}
