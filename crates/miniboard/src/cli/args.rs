//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use super::types::{IssueRef, IssueStatusArg, IssueTypeArg};
use super::validators::{
    validate_comment, validate_due_date, validate_issue_ref, validate_name, validate_project_key,
    validate_title, validate_username,
};
use crate::domain::{CommentId, ReleaseId};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Create this user and make it the default author
    #[arg(short, long, value_parser = validate_username)]
    pub user: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {}

/// Arguments for the `user` command
#[derive(Parser, Debug, Clone)]
pub struct UserArgs {
    /// User action
    #[command(subcommand)]
    pub action: UserAction,
}

/// User subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum UserAction {
    /// Add a user
    Add {
        /// Username (no whitespace, at most 50 characters)
        #[arg(value_parser = validate_username)]
        username: String,
    },

    /// List users
    List,
}

/// Arguments for the `project` command
#[derive(Parser, Debug, Clone)]
pub struct ProjectArgs {
    /// Project action
    #[command(subcommand)]
    pub action: ProjectAction,
}

/// Project subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProjectAction {
    /// Create a project
    Create {
        /// Short key used in issue references (e.g., "MB" for MB-12)
        #[arg(value_parser = validate_project_key)]
        key: String,

        /// Project name
        #[arg(long, value_parser = validate_name)]
        name: String,

        /// Project description
        #[arg(short = 'D', long, default_value = "")]
        description: String,
    },

    /// List projects
    List,

    /// Show a project
    Show {
        /// Project key or id
        project: String,
    },

    /// Update a project
    Update {
        /// Project key or id
        project: String,

        /// New name
        #[arg(long, value_parser = validate_name)]
        name: Option<String>,

        /// New description
        #[arg(short = 'D', long)]
        description: Option<String>,
    },

    /// Delete a project with all of its issues
    Delete {
        /// Project key or id
        project: String,
    },
}

/// Arguments for the `release` command
#[derive(Parser, Debug, Clone)]
pub struct ReleaseArgs {
    /// Release action
    #[command(subcommand)]
    pub action: ReleaseAction,
}

/// Release subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ReleaseAction {
    /// Create a release
    Create {
        /// Release name
        #[arg(value_parser = validate_name)]
        name: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = validate_due_date)]
        due: NaiveDate,
    },

    /// List releases that are not yet due, latest first
    List {
        /// Include releases whose due date has passed
        #[arg(short, long)]
        all: bool,
    },

    /// Update a release
    Update {
        /// Release id
        release: ReleaseId,

        /// New name
        #[arg(long, value_parser = validate_name)]
        name: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long, value_parser = validate_due_date)]
        due: Option<NaiveDate>,
    },

    /// Delete a release with all of its issues
    Delete {
        /// Release id
        release: ReleaseId,
    },
}

/// Arguments for the `create` command
#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Project key or id
    #[arg(short, long)]
    pub project: String,

    /// Release id
    #[arg(short, long)]
    pub release: ReleaseId,

    /// Issue title (maximum 200 characters)
    #[arg(long, value_parser = validate_title)]
    pub title: String,

    /// Detailed description
    #[arg(short = 'D', long, default_value = "")]
    pub description: String,

    /// Issue type
    #[arg(short = 't', long = "type", value_enum, default_value = "feature")]
    pub issue_type: IssueTypeArg,

    /// Story points
    #[arg(long, default_value = "0")]
    pub points: u32,
}

/// Arguments for the `list` command
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Only issues in this project (key or id)
    #[arg(short, long)]
    pub project: Option<String>,

    /// Only issues in this release
    #[arg(short, long)]
    pub release: Option<ReleaseId>,

    /// Page number, starting at 1
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Issues per page (defaults to `page-size` from the config)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Issue reference (e.g., MB-12 or 12)
    #[arg(value_parser = validate_issue_ref)]
    pub issue: IssueRef,
}

/// Arguments for the `update` command
#[derive(Parser, Debug, Clone)]
pub struct UpdateArgs {
    /// Issue reference (e.g., MB-12 or 12)
    #[arg(value_parser = validate_issue_ref)]
    pub issue: IssueRef,

    /// New title (maximum 200 characters)
    #[arg(long, value_parser = validate_title)]
    pub title: Option<String>,

    /// New description
    #[arg(short = 'D', long)]
    pub description: Option<String>,

    /// New type
    #[arg(short = 't', long = "type", value_enum)]
    pub issue_type: Option<IssueTypeArg>,

    /// New status
    #[arg(short, long, value_enum)]
    pub status: Option<IssueStatusArg>,

    /// New story points
    #[arg(long)]
    pub points: Option<u32>,

    /// Move to another release (appended at the bottom)
    #[arg(short, long)]
    pub release: Option<ReleaseId>,
}

/// Arguments for the `delete` command
#[derive(Parser, Debug, Clone)]
pub struct DeleteArgs {
    /// Issue reference (e.g., MB-12 or 12)
    #[arg(value_parser = validate_issue_ref)]
    pub issue: IssueRef,
}

/// Arguments for the `move` command
#[derive(Parser, Debug, Clone)]
pub struct MoveArgs {
    /// The issue to move
    #[arg(value_parser = validate_issue_ref)]
    pub source: IssueRef,

    /// The issue whose place it takes
    #[arg(value_parser = validate_issue_ref)]
    pub target: IssueRef,
}

/// Arguments for the `comment` command
#[derive(Parser, Debug, Clone)]
pub struct CommentArgs {
    /// Comment action
    #[command(subcommand)]
    pub action: CommentAction,
}

/// Comment subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum CommentAction {
    /// Comment on an issue
    Add {
        /// Issue reference (e.g., MB-12 or 12)
        #[arg(value_parser = validate_issue_ref)]
        issue: IssueRef,

        /// Comment text
        #[arg(value_parser = validate_comment)]
        content: String,
    },

    /// List the comments on an issue
    List {
        /// Issue reference (e.g., MB-12 or 12)
        #[arg(value_parser = validate_issue_ref)]
        issue: IssueRef,
    },

    /// Delete a comment
    Delete {
        /// Comment id
        comment: CommentId,
    },
}
