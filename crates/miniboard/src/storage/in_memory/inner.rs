//! Core in-memory storage data structures.
//!
//! This module contains the inner storage structure that holds all records
//! and is wrapped in `Arc<Mutex<>>` for thread safety.

use crate::domain::{
    Comment, CommentId, EntityKind, Issue, IssueId, Project, ProjectId, Release, ReleaseId, User,
    UserId,
};
use crate::error::{Error, Result, StorageError};
use crate::reorder::{self, Placement, PriorityUpdate, Ranked};
use crate::storage::Snapshot;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Inner storage structure (not thread-safe).
///
/// Records are kept in ordered maps so exports come out sorted by id and new
/// ids can be taken from the largest key.
#[derive(Debug, Default)]
pub(crate) struct BoardInner {
    pub(super) users: BTreeMap<UserId, User>,
    pub(super) projects: BTreeMap<ProjectId, Project>,
    pub(super) releases: BTreeMap<ReleaseId, Release>,
    pub(super) issues: BTreeMap<IssueId, Issue>,
    pub(super) comments: BTreeMap<CommentId, Comment>,
}

/// `max(existing) + 1`, starting at 1.
pub(super) fn next_id<K, V>(map: &BTreeMap<K, V>) -> Result<K>
where
    K: Copy + Into<u64> + From<u64>,
{
    let last = map.keys().next_back().map_or(0, |&id| id.into());
    last.checked_add(1)
        .map(K::from)
        .ok_or_else(|| invalid(format!("no ids left after {last}")))
}

fn invalid(message: String) -> Error {
    StorageError::InvalidFormat(message).into()
}

/// Insert keyed records, failing on the first repeated id.
fn collect_unique<K: Ord + Copy + Into<u64>, V>(
    kind: EntityKind,
    records: Vec<V>,
    key: impl Fn(&V) -> K,
) -> Result<BTreeMap<K, V>> {
    let mut map = BTreeMap::new();
    for record in records {
        let id = key(&record);
        if map.insert(id, record).is_some() {
            return Err(invalid(format!("duplicate {kind} id {}", id.into())));
        }
    }
    Ok(map)
}

impl BoardInner {
    /// Create a new empty board.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Build a board from a consistent snapshot.
    ///
    /// Rejects repeated ids, repeated usernames or project keys, references
    /// to missing records and releases whose priorities are not dense.
    pub(super) fn from_snapshot(mut snapshot: Snapshot) -> Result<Self> {
        for project in &mut snapshot.projects {
            project.key.make_ascii_uppercase();
        }
        let board = Self {
            users: collect_unique(EntityKind::User, snapshot.users, |u| u.id)?,
            projects: collect_unique(EntityKind::Project, snapshot.projects, |p| p.id)?,
            releases: collect_unique(EntityKind::Release, snapshot.releases, |r| r.id)?,
            issues: collect_unique(EntityKind::Issue, snapshot.issues, |i| i.id)?,
            comments: collect_unique(EntityKind::Comment, snapshot.comments, |c| c.id)?,
        };

        let mut usernames = HashSet::new();
        for user in board.users.values() {
            if !usernames.insert(user.username.as_str()) {
                return Err(invalid(format!("duplicate username {}", user.username)));
            }
        }
        let mut keys = HashSet::new();
        for project in board.projects.values() {
            if !keys.insert(project.key.as_str()) {
                return Err(invalid(format!("duplicate project key {}", project.key)));
            }
        }

        for issue in board.issues.values() {
            board.require_project(issue.project_id)?;
            board.require_release(issue.release_id)?;
            board.require_user(issue.author_id)?;
        }
        for comment in board.comments.values() {
            board.require_issue(comment.issue_id)?;
            board.require_user(comment.author_id)?;
        }

        let placements: Vec<Placement> = board.issues.values().map(Placement::of).collect();
        reorder::verify_density(&placements).map_err(|err| invalid(err.to_string()))?;

        Ok(board)
    }

    /// Copy every record out, each kind sorted by id.
    pub(super) fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            users: self.users.values().cloned().collect(),
            projects: self.projects.values().cloned().collect(),
            releases: self.releases.values().cloned().collect(),
            issues: self.issues.values().cloned().collect(),
            comments: self.comments.values().cloned().collect(),
        }
    }

    pub(super) fn require_user(&self, id: UserId) -> Result<&User> {
        self.users.get(&id).ok_or_else(|| id.not_found())
    }

    pub(super) fn require_project(&self, id: ProjectId) -> Result<&Project> {
        self.projects.get(&id).ok_or_else(|| id.not_found())
    }

    pub(super) fn require_release(&self, id: ReleaseId) -> Result<&Release> {
        self.releases.get(&id).ok_or_else(|| id.not_found())
    }

    pub(super) fn require_issue(&self, id: IssueId) -> Result<&Issue> {
        self.issues.get(&id).ok_or_else(|| id.not_found())
    }

    /// Placements of every issue in `releases`, in board order: releases in
    /// the order given, issues by ascending priority.
    pub(super) fn placements(&self, releases: &[ReleaseId]) -> Vec<Placement> {
        let mut seen = HashSet::new();
        let mut board = Vec::new();
        for &release_id in releases {
            if !seen.insert(release_id) {
                continue;
            }
            let mut in_release: Vec<Placement> = self
                .issues
                .values()
                .filter(|issue| issue.release_id == release_id)
                .map(Placement::of)
                .collect();
            in_release.sort_by_key(|p| (p.priority, p.issue_id));
            board.extend(in_release);
        }
        board
    }

    /// Append position for a new issue in `release_id`.
    pub(super) fn next_priority(&self, release_id: ReleaseId) -> u32 {
        reorder::next_priority(&self.placements(&[release_id]), release_id)
    }

    /// Write placement updates back to the stored issues.
    pub(super) fn apply(&mut self, updates: &[PriorityUpdate], now: DateTime<Utc>) {
        for update in updates {
            if let Some(issue) = self.issues.get_mut(&update.issue_id) {
                issue.place(update.release_id, update.priority);
                issue.updated_at = now;
            }
        }
    }

    /// Close any priority gaps in `release_id`.
    pub(super) fn compact_release(&mut self, release_id: ReleaseId, now: DateTime<Utc>) {
        let updates = reorder::compact(&self.placements(&[release_id]), release_id);
        if !updates.is_empty() {
            tracing::debug!(release_id = %release_id, changed = updates.len(), "compacted release");
            self.apply(&updates, now);
        }
    }

    /// Remove issues and their comments, returning the releases they left.
    pub(super) fn remove_issues(&mut self, ids: &[IssueId]) -> BTreeSet<ReleaseId> {
        let mut affected = BTreeSet::new();
        for id in ids {
            if let Some(issue) = self.issues.remove(id) {
                affected.insert(issue.release_id);
            }
        }
        let removed: HashSet<IssueId> = ids.iter().copied().collect();
        self.comments
            .retain(|_, comment| !removed.contains(&comment.issue_id));
        affected
    }
}
