//! Orderings used by list queries.

use crate::domain::{Issue, Release, ReleaseId};
use chrono::NaiveDate;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Sort issues the way the board shows them.
///
/// Releases due last come first; inside a release issues follow their
/// priority. Release id and issue id break ties so the order is deterministic
/// when two releases share a due date.
pub(super) fn sort_for_board(issues: &mut [Issue], releases: &BTreeMap<ReleaseId, Release>) {
    issues.sort_by_key(|issue| {
        let (due, release_id) = release_rank(issue.release_id, releases);
        (due, release_id, issue.priority, issue.id)
    });
}

/// `ids` in board order without repeats, whatever order they came in.
pub(super) fn board_release_order(
    ids: &[ReleaseId],
    releases: &BTreeMap<ReleaseId, Release>,
) -> Vec<ReleaseId> {
    let mut ordered = ids.to_vec();
    ordered.sort_by_key(|&id| release_rank(id, releases));
    ordered.dedup();
    ordered
}

fn release_rank(
    release_id: ReleaseId,
    releases: &BTreeMap<ReleaseId, Release>,
) -> (Reverse<Option<NaiveDate>>, ReleaseId) {
    let due = releases.get(&release_id).map(|r| r.due_date);
    (Reverse(due), release_id)
}

/// Latest due date first, then by id.
pub(super) fn sort_releases(releases: &mut [Release]) {
    releases.sort_by_key(|release| (Reverse(release.due_date), release.id));
}

/// One page of `items`. Pages are 1-based; page 0 is treated as page 1 and a
/// missing limit returns everything.
pub(super) fn paginate<T>(items: Vec<T>, page: Option<usize>, limit: Option<usize>) -> Vec<T> {
    let Some(limit) = limit else {
        return items;
    };
    let page = page.unwrap_or(1).max(1);
    let skip = (page - 1).saturating_mul(limit);
    items.into_iter().skip(skip).take(limit).collect()
}
