//! `BoardStorage` trait implementation for in-memory storage.

use super::InMemoryStorage;
use super::inner::{BoardInner, next_id};
use super::sorting::{board_release_order, paginate, sort_for_board, sort_releases};
use crate::domain::{
    Comment, CommentId, Issue, IssueFilter, IssueId, IssuePage, IssueStatus, IssueUpdate,
    NewComment, NewIssue, NewProject, NewRelease, NewUser, Project, ProjectId, ProjectUpdate,
    Release, ReleaseFilter, ReleaseId, ReleaseUpdate, User, UserId, validate_comment,
    validate_title, validate_username,
};
use crate::error::{Error, Result};
use crate::reorder::{self, PriorityUpdate};
use crate::storage::{BoardStorage, Snapshot};
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl BoardStorage for InMemoryStorage {
    async fn create_user(&mut self, user: NewUser) -> Result<User> {
        let mut inner = self.lock().await;

        validate_username(&user.username).map_err(Error::Validation)?;
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(Error::Conflict(format!(
                "username '{}' is already taken",
                user.username
            )));
        }

        let user = User {
            id: next_id(&inner.users)?,
            username: user.username,
            created_at: Utc::now(),
        };
        tracing::debug!(user_id = %user.id, username = %user.username, "created user");
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let inner = self.lock().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn find_user_by_name(&self, username: &str) -> Result<Option<User>> {
        let inner = self.lock().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let inner = self.lock().await;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn create_project(&mut self, project: NewProject) -> Result<Project> {
        let mut inner = self.lock().await;

        project.validate().map_err(Error::Validation)?;
        let key = project.key.to_ascii_uppercase();
        if inner.projects.values().any(|p| p.key.eq_ignore_ascii_case(&key)) {
            return Err(Error::Conflict(format!(
                "project key '{key}' is already in use"
            )));
        }

        let project = Project {
            id: next_id(&inner.projects)?,
            key,
            name: project.name,
            description: project.description,
            created_at: Utc::now(),
        };
        tracing::debug!(project_id = %project.id, key = %project.key, "created project");
        inner.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>> {
        let inner = self.lock().await;
        Ok(inner.projects.get(&id).cloned())
    }

    async fn find_project_by_key(&self, key: &str) -> Result<Option<Project>> {
        let inner = self.lock().await;
        Ok(inner
            .projects
            .values()
            .find(|p| p.key.eq_ignore_ascii_case(key))
            .cloned())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let inner = self.lock().await;
        let mut projects: Vec<Project> = inner.projects.values().cloned().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(projects)
    }

    async fn update_project(&mut self, id: ProjectId, update: ProjectUpdate) -> Result<Project> {
        let mut inner = self.lock().await;

        if let Some(name) = &update.name {
            validate_title("Project name", name).map_err(Error::Validation)?;
        }

        let project = inner.projects.get_mut(&id).ok_or_else(|| id.not_found())?;
        if let Some(name) = update.name {
            project.name = name;
        }
        if let Some(description) = update.description {
            project.description = description;
        }
        Ok(project.clone())
    }

    async fn delete_project(&mut self, id: ProjectId) -> Result<()> {
        let mut inner = self.lock().await;

        inner.projects.remove(&id).ok_or_else(|| id.not_found())?;

        let doomed: Vec<IssueId> = inner
            .issues
            .values()
            .filter(|issue| issue.project_id == id)
            .map(|issue| issue.id)
            .collect();
        let now = Utc::now();
        for release_id in inner.remove_issues(&doomed) {
            inner.compact_release(release_id, now);
        }
        tracing::debug!(project_id = %id, issues = doomed.len(), "deleted project");
        Ok(())
    }

    async fn create_release(&mut self, release: NewRelease) -> Result<Release> {
        let mut inner = self.lock().await;

        validate_title("Release name", &release.name).map_err(Error::Validation)?;

        let release = Release {
            id: next_id(&inner.releases)?,
            name: release.name,
            due_date: release.due_date,
            created_at: Utc::now(),
        };
        tracing::debug!(release_id = %release.id, due = %release.due_date, "created release");
        inner.releases.insert(release.id, release.clone());
        Ok(release)
    }

    async fn get_release(&self, id: ReleaseId) -> Result<Option<Release>> {
        let inner = self.lock().await;
        Ok(inner.releases.get(&id).cloned())
    }

    async fn list_releases(&self, filter: &ReleaseFilter) -> Result<Vec<Release>> {
        let inner = self.lock().await;
        let mut releases: Vec<Release> = inner
            .releases
            .values()
            .filter(|r| filter.due_from.is_none_or(|from| r.due_date >= from))
            .cloned()
            .collect();
        sort_releases(&mut releases);
        Ok(releases)
    }

    async fn update_release(&mut self, id: ReleaseId, update: ReleaseUpdate) -> Result<Release> {
        let mut inner = self.lock().await;

        if let Some(name) = &update.name {
            validate_title("Release name", name).map_err(Error::Validation)?;
        }

        let release = inner.releases.get_mut(&id).ok_or_else(|| id.not_found())?;
        if let Some(name) = update.name {
            release.name = name;
        }
        if let Some(due_date) = update.due_date {
            release.due_date = due_date;
        }
        Ok(release.clone())
    }

    async fn delete_release(&mut self, id: ReleaseId) -> Result<()> {
        let mut inner = self.lock().await;

        inner.releases.remove(&id).ok_or_else(|| id.not_found())?;

        // Every issue of the release goes, so nothing is left to compact.
        let doomed: Vec<IssueId> = inner
            .issues
            .values()
            .filter(|issue| issue.release_id == id)
            .map(|issue| issue.id)
            .collect();
        inner.remove_issues(&doomed);
        tracing::debug!(release_id = %id, issues = doomed.len(), "deleted release");
        Ok(())
    }

    async fn create_issue(&mut self, new_issue: NewIssue) -> Result<Issue> {
        let mut inner = self.lock().await;

        // === Phase 1: All validations (no mutations) ===
        new_issue.validate().map_err(Error::Validation)?;
        inner.require_project(new_issue.project_id)?;
        inner.require_release(new_issue.release_id)?;
        inner.require_user(new_issue.author_id)?;

        // === Phase 2: Create at the bottom of the release ===
        let now = Utc::now();
        let issue = Issue {
            id: next_id(&inner.issues)?,
            project_id: new_issue.project_id,
            release_id: new_issue.release_id,
            author_id: new_issue.author_id,
            priority: inner.next_priority(new_issue.release_id),
            issue_type: new_issue.issue_type,
            status: IssueStatus::Todo,
            points: new_issue.points,
            title: new_issue.title,
            description: new_issue.description,
            created_at: now,
            updated_at: now,
        };
        tracing::debug!(
            issue_id = %issue.id,
            release_id = %issue.release_id,
            priority = issue.priority,
            "created issue"
        );
        inner.issues.insert(issue.id, issue.clone());
        Ok(issue)
    }

    async fn get_issue(&self, id: IssueId) -> Result<Option<Issue>> {
        let inner = self.lock().await;
        Ok(inner.issues.get(&id).cloned())
    }

    async fn update_issue(&mut self, id: IssueId, update: IssueUpdate) -> Result<Issue> {
        let mut inner = self.lock().await;

        // === Phase 1: All validations (no mutations) ===
        let current_release = inner.require_issue(id)?.release_id;
        if let Some(title) = &update.title {
            validate_title("Title", title).map_err(Error::Validation)?;
        }
        let new_release = match update.release_id {
            Some(release_id) if release_id != current_release => {
                inner.require_release(release_id)?;
                Some((release_id, inner.next_priority(release_id)))
            }
            _ => None,
        };

        // === Phase 2: Apply ===
        let now = Utc::now();
        let issue = inner.issues.get_mut(&id).ok_or_else(|| id.not_found())?;
        if let Some(title) = update.title {
            issue.title = title;
        }
        if let Some(description) = update.description {
            issue.description = description;
        }
        if let Some(issue_type) = update.issue_type {
            issue.issue_type = issue_type;
        }
        if let Some(status) = update.status {
            issue.status = status;
        }
        if let Some(points) = update.points {
            issue.points = points;
        }
        if let Some((release_id, priority)) = new_release {
            issue.release_id = release_id;
            issue.priority = priority;
        }
        issue.updated_at = now;

        if new_release.is_some() {
            inner.compact_release(current_release, now);
        }
        inner.require_issue(id).cloned()
    }

    async fn delete_issue(&mut self, id: IssueId) -> Result<()> {
        let mut inner = self.lock().await;

        inner.require_issue(id)?;
        let now = Utc::now();
        for release_id in inner.remove_issues(&[id]) {
            inner.compact_release(release_id, now);
        }
        tracing::debug!(issue_id = %id, "deleted issue");
        Ok(())
    }

    async fn list_issues(&self, filter: &IssueFilter) -> Result<IssuePage> {
        let inner = self.lock().await;

        let mut issues: Vec<Issue> = inner
            .issues
            .values()
            .filter(|issue| filter.project_id.is_none_or(|p| issue.project_id == p))
            .filter(|issue| filter.release_id.is_none_or(|r| issue.release_id == r))
            .cloned()
            .collect();
        sort_for_board(&mut issues, &inner.releases);

        let total = issues.len();
        let issues = paginate(issues, filter.page, filter.limit);
        Ok(IssuePage { issues, total })
    }

    async fn move_issue(
        &mut self,
        source: IssueId,
        target: IssueId,
    ) -> Result<Vec<PriorityUpdate>> {
        // One lock for the read, the computation and the write.
        let mut inner = self.lock().await;

        let (Some(source_issue), Some(target_issue)) =
            (inner.issues.get(&source), inner.issues.get(&target))
        else {
            tracing::debug!(%source, %target, "move skipped: unknown issue");
            return Ok(Vec::new());
        };

        let releases = board_release_order(
            &[source_issue.release_id, target_issue.release_id],
            &inner.releases,
        );
        let board = inner.placements(&releases);
        let updates = reorder::reorder(&board, source, target);
        inner.apply(&updates, Utc::now());

        tracing::debug!(%source, %target, changed = updates.len(), "moved issue");
        Ok(updates)
    }

    async fn add_comment(&mut self, comment: NewComment) -> Result<Comment> {
        let mut inner = self.lock().await;

        validate_comment(&comment.content).map_err(Error::Validation)?;
        inner.require_issue(comment.issue_id)?;
        inner.require_user(comment.author_id)?;

        let comment = Comment {
            id: next_id(&inner.comments)?,
            issue_id: comment.issue_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: Utc::now(),
        };
        inner.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, issue_id: IssueId) -> Result<Vec<Comment>> {
        let inner = self.lock().await;

        inner.require_issue(issue_id)?;
        let mut comments: Vec<Comment> = inner
            .comments
            .values()
            .filter(|c| c.issue_id == issue_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        Ok(comments)
    }

    async fn delete_comment(&mut self, id: CommentId) -> Result<()> {
        let mut inner = self.lock().await;
        inner.comments.remove(&id).ok_or_else(|| id.not_found())?;
        Ok(())
    }

    async fn import(&mut self, snapshot: Snapshot) -> Result<()> {
        let board = BoardInner::from_snapshot(snapshot)?;
        let mut inner = self.lock().await;
        *inner = board;
        Ok(())
    }

    async fn export_all(&self) -> Result<Snapshot> {
        let inner = self.lock().await;
        Ok(inner.to_snapshot())
    }

    async fn save(&self) -> Result<()> {
        // No-op for in-memory storage
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        // No-op for in-memory storage (nothing to reload from)
        Ok(())
    }
}
