//! Priority ordering of issues within releases.
//!
//! Every release keeps its issues ranked `0..n-1` with no gaps or duplicates.
//! [`reorder`] computes the placements that change when one issue is dragged
//! onto another; the helpers here keep that invariant across creates, deletes
//! and loads. Nothing in this module performs I/O: callers fetch the records,
//! compute, then persist the returned updates.

use crate::domain::{Issue, IssueId, ReleaseId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// A record with a position on the board.
pub trait Ranked {
    /// Issue identity.
    fn id(&self) -> IssueId;

    /// Release the record belongs to.
    fn release_id(&self) -> ReleaseId;

    /// Rank within the release.
    fn priority(&self) -> u32;

    /// Move the record to `release_id` at `priority`.
    fn place(&mut self, release_id: ReleaseId, priority: u32);
}

impl Ranked for Issue {
    fn id(&self) -> IssueId {
        self.id
    }

    fn release_id(&self) -> ReleaseId {
        self.release_id
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn place(&mut self, release_id: ReleaseId, priority: u32) {
        self.release_id = release_id;
        self.priority = priority;
    }
}

/// Where an issue sits: its release and its rank inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// The issue being placed.
    pub issue_id: IssueId,
    /// Release the issue belongs to.
    pub release_id: ReleaseId,
    /// Rank within the release.
    pub priority: u32,
}

impl Placement {
    /// Creates a placement.
    #[must_use]
    pub const fn new(issue_id: IssueId, release_id: ReleaseId, priority: u32) -> Self {
        Self {
            issue_id,
            release_id,
            priority,
        }
    }

    /// Captures the current placement of a ranked record.
    #[must_use]
    pub fn of<T: Ranked>(record: &T) -> Self {
        Self::new(record.id(), record.release_id(), record.priority())
    }
}

impl Ranked for Placement {
    fn id(&self) -> IssueId {
        self.issue_id
    }

    fn release_id(&self) -> ReleaseId {
        self.release_id
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn place(&mut self, release_id: ReleaseId, priority: u32) {
        self.release_id = release_id;
        self.priority = priority;
    }
}

/// The new placement of an issue whose release or priority changed.
pub type PriorityUpdate = Placement;

/// A release whose priorities are not exactly `0..n-1`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("release {release_id} priorities are not dense: {priorities:?}")]
pub struct DensityViolation {
    /// The offending release.
    pub release_id: ReleaseId,
    /// Its priorities, sorted.
    pub priorities: Vec<u32>,
}

/// Computes the updates that move `source` to the board position of `target`.
///
/// The board lists releases in order of first appearance in `issues`, and
/// each release's issues by ascending priority (input order breaks ties).
/// The source is taken out of the board and reinserted at the target's
/// position, adopting the target's release; the source and target releases
/// are then renumbered densely. Only issues whose placement changed are
/// returned, in board order.
///
/// `issues` must hold every issue of the source and target releases. A
/// missing source or target, or `source == target`, yields no updates.
///
/// ```
/// use miniboard::domain::{IssueId, ReleaseId};
/// use miniboard::reorder::{reorder, Placement};
///
/// let r1 = ReleaseId::new(1);
/// let r2 = ReleaseId::new(2);
/// let board = [
///     Placement::new(IssueId::new(1), r1, 0),
///     Placement::new(IssueId::new(2), r1, 1),
///     Placement::new(IssueId::new(3), r2, 0),
///     Placement::new(IssueId::new(4), r2, 1),
/// ];
///
/// let updates = reorder(&board, IssueId::new(1), IssueId::new(3));
/// assert_eq!(
///     updates,
///     vec![
///         Placement::new(IssueId::new(2), r1, 0),
///         Placement::new(IssueId::new(1), r2, 1),
///         Placement::new(IssueId::new(4), r2, 2),
///     ]
/// );
/// ```
#[must_use]
pub fn reorder<T: Ranked>(issues: &[T], source: IssueId, target: IssueId) -> Vec<PriorityUpdate> {
    if source == target {
        return Vec::new();
    }

    let mut board = board_order(issues);
    let position = |id: IssueId| board.iter().position(|p| p.issue_id == id);
    let (Some(from), Some(to)) = (position(source), position(target)) else {
        return Vec::new();
    };

    let source_release = board[from].release_id;
    let target_release = board[to].release_id;

    let mut moved = board.remove(from);
    moved.release_id = target_release;
    board.insert(to, moved);

    renumber(issues, &board, &[source_release, target_release])
}

/// Renumbers one release densely, keeping its current order.
///
/// Returns updates only for issues whose priority changes; a release that is
/// already dense yields nothing.
#[must_use]
pub fn compact<T: Ranked>(issues: &[T], release_id: ReleaseId) -> Vec<PriorityUpdate> {
    let board = board_order(issues);
    renumber(issues, &board, &[release_id])
}

/// The priority a new issue appended to `release_id` receives.
#[must_use]
pub fn next_priority<T: Ranked>(issues: &[T], release_id: ReleaseId) -> u32 {
    let count = issues
        .iter()
        .filter(|issue| issue.release_id() == release_id)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Checks that every release in `issues` is ranked exactly `0..n-1`.
///
/// # Errors
///
/// Returns the lowest-numbered release that violates the invariant.
pub fn verify_density<T: Ranked>(issues: &[T]) -> Result<(), DensityViolation> {
    let mut by_release: BTreeMap<ReleaseId, Vec<u32>> = BTreeMap::new();
    for issue in issues {
        by_release
            .entry(issue.release_id())
            .or_default()
            .push(issue.priority());
    }

    for (release_id, mut priorities) in by_release {
        priorities.sort_unstable();
        let dense = priorities
            .iter()
            .enumerate()
            .all(|(index, &priority)| usize::try_from(priority).is_ok_and(|p| p == index));
        if !dense {
            return Err(DensityViolation {
                release_id,
                priorities,
            });
        }
    }
    Ok(())
}

/// Applies `updates` to the matching records, returning how many changed.
///
/// Updates naming an issue that is not in `issues` are ignored.
pub fn apply_updates<T: Ranked>(issues: &mut [T], updates: &[PriorityUpdate]) -> usize {
    let by_id: HashMap<IssueId, &PriorityUpdate> =
        updates.iter().map(|update| (update.issue_id, update)).collect();

    let mut applied = 0;
    for issue in issues.iter_mut() {
        if let Some(update) = by_id.get(&issue.id()) {
            issue.place(update.release_id, update.priority);
            applied += 1;
        }
    }
    applied
}

/// Placements sorted into board order.
fn board_order<T: Ranked>(issues: &[T]) -> Vec<Placement> {
    let mut release_rank: HashMap<ReleaseId, usize> = HashMap::new();
    for issue in issues {
        let next = release_rank.len();
        release_rank.entry(issue.release_id()).or_insert(next);
    }

    let mut board: Vec<Placement> = issues.iter().map(Placement::of).collect();
    board.sort_by_key(|p| (release_rank[&p.release_id], p.priority));
    board
}

/// Numbers the issues of `releases` in board order and diffs against `issues`.
fn renumber<T: Ranked>(
    issues: &[T],
    board: &[Placement],
    releases: &[ReleaseId],
) -> Vec<PriorityUpdate> {
    let original: HashMap<IssueId, (ReleaseId, u32)> = issues
        .iter()
        .map(|issue| (issue.id(), (issue.release_id(), issue.priority())))
        .collect();
    let mut counters: HashMap<ReleaseId, u32> = releases.iter().map(|&r| (r, 0)).collect();

    let mut updates = Vec::new();
    for entry in board {
        let Some(counter) = counters.get_mut(&entry.release_id) else {
            continue;
        };
        let priority = *counter;
        *counter += 1;

        if original.get(&entry.issue_id) != Some(&(entry.release_id, priority)) {
            updates.push(PriorityUpdate::new(entry.issue_id, entry.release_id, priority));
        }
    }
    updates
}
