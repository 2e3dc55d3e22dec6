//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands. Every
//! mutating command saves the board before printing its result.

use anyhow::Result;

use super::args::{
    CommentAction, CommentArgs, CreateArgs, DeleteArgs, InfoArgs, InitArgs, ListArgs, MoveArgs,
    ProjectAction, ProjectArgs, ReleaseAction, ReleaseArgs, ShowArgs, UpdateArgs, UserAction,
    UserArgs,
};
use super::types::IssueRef;
use crate::app::App;
use crate::domain::{
    Issue, IssueFilter, IssueStatus, IssueUpdate, NewComment, NewIssue, NewProject, NewRelease,
    NewUser, ProjectUpdate, ReleaseFilter, ReleaseUpdate,
};
use crate::output::{self, Names, OutputMode};

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;

    if !args.quiet {
        println!("Initializing board...");
    }

    let result = init::init(&current_dir, args.user.as_deref()).await?;

    if !args.quiet {
        println!("Initialized board in {}", result.miniboard_dir.display());
        println!("  Config: {}", result.config_file.display());
        println!("  Data:   {}", result.data_file.display());
        if let Some(user) = &result.user {
            println!("  User:   {} (default author)", user.username);
        }
    }

    Ok(())
}

/// Execute the info command
pub async fn execute_info(app: &App, _args: &InfoArgs, output_mode: OutputMode) -> Result<()> {
    let snapshot = app.storage().export_all().await?;
    let data_file = app
        .miniboard_dir()
        .parent()
        .map(|root| app.config().storage.to_backend(root))
        .transpose()?
        .and_then(|backend| backend.data_path().map(|p| p.display().to_string()));

    let (todo, doing, done) =
        snapshot
            .issues
            .iter()
            .fold((0, 0, 0), |(t, g, d), issue| match issue.status {
                IssueStatus::Todo => (t + 1, g, d),
                IssueStatus::Doing => (t, g + 1, d),
                IssueStatus::Done => (t, g, d + 1),
            });

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "data_file": data_file,
                "default_user": app.config().default_user,
                "users": snapshot.users.len(),
                "projects": snapshot.projects.len(),
                "releases": snapshot.releases.len(),
                "issues": {
                    "total": snapshot.issues.len(),
                    "todo": todo,
                    "doing": doing,
                    "done": done
                },
                "comments": snapshot.comments.len()
            }))?;
        }
        OutputMode::Text => {
            println!("Mini Board Information");
            println!("======================");
            println!();
            println!(
                "Data file:    {}",
                data_file.as_deref().unwrap_or("(in memory)")
            );
            println!(
                "Default user: {}",
                app.config().default_user.as_deref().unwrap_or("(none)")
            );
            println!();
            println!(
                "{} user(s), {} project(s), {} release(s), {} comment(s)",
                snapshot.users.len(),
                snapshot.projects.len(),
                snapshot.releases.len(),
                snapshot.comments.len()
            );
            println!(
                "Issues: {} total ({} todo, {} doing, {} done)",
                snapshot.issues.len(),
                todo,
                doing,
                done
            );
        }
    }

    Ok(())
}

/// Execute the user command
pub async fn execute_user(app: &mut App, args: &UserArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        UserAction::Add { username } => {
            let user = app
                .storage_mut()
                .create_user(NewUser {
                    username: username.clone(),
                })
                .await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&user)?,
                OutputMode::Text => println!("Added user {} ({})", user.username, user.id),
            }
        }
        UserAction::List => {
            let users = app.storage().list_users().await?;
            output::print_users(&users, output_mode)?;
        }
    }
    Ok(())
}

/// Execute the project command
pub async fn execute_project(
    app: &mut App,
    args: &ProjectArgs,
    output_mode: OutputMode,
) -> Result<()> {
    match &args.action {
        ProjectAction::Create {
            key,
            name,
            description,
        } => {
            let project = app
                .storage_mut()
                .create_project(NewProject {
                    key: key.clone(),
                    name: name.clone(),
                    description: description.clone(),
                })
                .await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&project)?,
                OutputMode::Text => {
                    println!("Created project {} ({})", project.key, project.name);
                }
            }
        }
        ProjectAction::List => {
            let projects = app.storage().list_projects().await?;
            output::print_projects(&projects, output_mode)?;
        }
        ProjectAction::Show { project } => {
            let project = app.find_project(project).await?;
            match output_mode {
                OutputMode::Json => output::print_json(&project)?,
                OutputMode::Text => output::print_projects(&[project], output_mode)?,
            }
        }
        ProjectAction::Update {
            project,
            name,
            description,
        } => {
            let id = app.find_project(project).await?.id;
            let project = app
                .storage_mut()
                .update_project(
                    id,
                    ProjectUpdate {
                        name: name.clone(),
                        description: description.clone(),
                    },
                )
                .await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&project)?,
                OutputMode::Text => println!("Updated project {}", project.key),
            }
        }
        ProjectAction::Delete { project } => {
            let project = app.find_project(project).await?;
            let issues = app
                .storage()
                .list_issues(&IssueFilter {
                    project_id: Some(project.id),
                    ..IssueFilter::default()
                })
                .await?
                .total;
            app.storage_mut().delete_project(project.id).await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "deleted": project,
                    "issues_deleted": issues
                }))?,
                OutputMode::Text => {
                    println!("Deleted project {} and {} issue(s)", project.key, issues);
                }
            }
        }
    }
    Ok(())
}

/// Execute the release command
pub async fn execute_release(
    app: &mut App,
    args: &ReleaseArgs,
    output_mode: OutputMode,
) -> Result<()> {
    match &args.action {
        ReleaseAction::Create { name, due } => {
            let release = app
                .storage_mut()
                .create_release(NewRelease {
                    name: name.clone(),
                    due_date: *due,
                })
                .await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&release)?,
                OutputMode::Text => println!(
                    "Created release {} ({}), due {}",
                    release.name, release.id, release.due_date
                ),
            }
        }
        ReleaseAction::List { all } => {
            let filter = ReleaseFilter {
                due_from: (!all).then(|| chrono::Local::now().date_naive()),
            };
            let releases = app.storage().list_releases(&filter).await?;
            output::print_releases(&releases, output_mode)?;
        }
        ReleaseAction::Update { release, name, due } => {
            let release = app
                .storage_mut()
                .update_release(
                    *release,
                    ReleaseUpdate {
                        name: name.clone(),
                        due_date: *due,
                    },
                )
                .await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&release)?,
                OutputMode::Text => println!("Updated release {}", release.name),
            }
        }
        ReleaseAction::Delete { release } => {
            let issues = app
                .storage()
                .list_issues(&IssueFilter {
                    release_id: Some(*release),
                    ..IssueFilter::default()
                })
                .await?
                .total;
            app.storage_mut().delete_release(*release).await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "deleted": release,
                    "issues_deleted": issues
                }))?,
                OutputMode::Text => {
                    println!("Deleted release {} and {} issue(s)", release, issues);
                }
            }
        }
    }
    Ok(())
}

/// Execute the create command
pub async fn execute_create(app: &mut App, args: &CreateArgs, output_mode: OutputMode) -> Result<()> {
    let project = app.find_project(&args.project).await?;
    let author = app.acting_user().await?;

    let new_issue = NewIssue {
        project_id: project.id,
        release_id: args.release,
        author_id: author.id,
        issue_type: args.issue_type.into(),
        points: args.points,
        title: args.title.clone(),
        description: args.description.clone(),
    };

    let issue = app.storage_mut().create_issue(new_issue).await?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&issue)?,
        OutputMode::Text => {
            println!("Created issue: {}", project.issue_ref(issue.id));
        }
    }

    Ok(())
}

/// Execute the list command
pub async fn execute_list(app: &App, args: &ListArgs, output_mode: OutputMode) -> Result<()> {
    let project_id = match &args.project {
        Some(reference) => Some(app.find_project(reference).await?.id),
        None => None,
    };

    let filter = IssueFilter {
        project_id,
        release_id: args.release,
        page: Some(args.page as usize),
        limit: Some(
            args.limit
                .map_or(app.config().page_size, |limit| limit as usize),
        ),
    };

    let page = app.storage().list_issues(&filter).await?;
    let names = names(app).await?;
    output::print_issue_page(&page, &names, output_mode)?;

    Ok(())
}

/// Execute the show command
pub async fn execute_show(app: &App, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let issue = resolve_issue(app, &args.issue).await?;
    let comments = app.storage().list_comments(issue.id).await?;
    let names = names(app).await?;

    output::print_issue_details(&issue, &comments, &names, output_mode)?;
    Ok(())
}

/// Execute the update command
pub async fn execute_update(app: &mut App, args: &UpdateArgs, output_mode: OutputMode) -> Result<()> {
    let issue = resolve_issue(app, &args.issue).await?;

    let update = IssueUpdate {
        title: args.title.clone(),
        description: args.description.clone(),
        issue_type: args.issue_type.map(Into::into),
        status: args.status.map(Into::into),
        points: args.points,
        release_id: args.release,
    };

    let issue = app.storage_mut().update_issue(issue.id, update).await?;
    app.save().await?;

    let names = names(app).await?;
    output::print_issue(&issue, &names, output_mode)?;
    Ok(())
}

/// Execute the delete command
pub async fn execute_delete(app: &mut App, args: &DeleteArgs, output_mode: OutputMode) -> Result<()> {
    let issue = resolve_issue(app, &args.issue).await?;

    app.storage_mut().delete_issue(issue.id).await?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "deleted": issue.id
        }))?,
        OutputMode::Text => println!("Deleted issue: {}", args.issue),
    }
    Ok(())
}

/// Execute the move command
///
/// Moving an issue that does not exist, or onto one that does not exist,
/// changes nothing and is not an error.
pub async fn execute_move(app: &mut App, args: &MoveArgs, output_mode: OutputMode) -> Result<()> {
    let updates = app.move_issue(args.source.id, args.target.id).await?;

    let all = app.storage().list_issues(&IssueFilter::default()).await?;
    let names = names(app).await?.with_issues(&all.issues);
    output::print_moves(&updates, &names, output_mode)?;
    Ok(())
}

/// Execute the comment command
pub async fn execute_comment(
    app: &mut App,
    args: &CommentArgs,
    output_mode: OutputMode,
) -> Result<()> {
    match &args.action {
        CommentAction::Add { issue, content } => {
            let target = resolve_issue(app, issue).await?;
            let author = app.acting_user().await?;

            let comment = app
                .storage_mut()
                .add_comment(NewComment {
                    issue_id: target.id,
                    author_id: author.id,
                    content: content.clone(),
                })
                .await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&comment)?,
                OutputMode::Text => println!("Added comment {} to {}", comment.id, issue),
            }
        }
        CommentAction::List { issue } => {
            let target = resolve_issue(app, issue).await?;
            let comments = app.storage().list_comments(target.id).await?;
            let names = names(app).await?;
            output::print_comments(&comments, &names, output_mode)?;
        }
        CommentAction::Delete { comment } => {
            app.storage_mut().delete_comment(*comment).await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "deleted": comment
                }))?,
                OutputMode::Text => println!("Deleted comment {comment}"),
            }
        }
    }
    Ok(())
}

/// Fetch an issue, checking the project key when the reference has one.
async fn resolve_issue(app: &App, reference: &IssueRef) -> Result<Issue> {
    let issue = app
        .storage()
        .get_issue(reference.id)
        .await?
        .ok_or_else(|| reference.id.not_found())?;

    if let Some(key) = &reference.key {
        let project = app.storage().get_project(issue.project_id).await?;
        if project.is_none_or(|p| !p.key.eq_ignore_ascii_case(key)) {
            anyhow::bail!("Issue not found: {reference}");
        }
    }
    Ok(issue)
}

async fn names(app: &App) -> Result<Names> {
    let storage = app.storage();
    let projects = storage.list_projects().await?;
    let releases = storage.list_releases(&ReleaseFilter::default()).await?;
    let users = storage.list_users().await?;
    Ok(Names::new(&projects, &releases, &users))
}
