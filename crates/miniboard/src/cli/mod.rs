//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for miniboard using clap's derive API.
//! Each command has its own argument struct with validation and helpful error messages.
//!
//! # Commands
//!
//! - `init`: Initialize a new board
//! - `info`: Show board information
//! - `user`, `project`, `release`: Manage users, projects and releases
//! - `create`, `list`, `show`, `update`, `delete`: Work with issues
//! - `move`: Put an issue in another issue's place on the board
//! - `comment`: Add, list and delete comments
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! miniboard init --user alice
//! miniboard project create MB --name "Mini Board"
//! miniboard release create 1.0 --due 2030-01-31
//! miniboard create --project MB --release 1 --title "Fix login" --type bug
//! miniboard move MB-3 MB-1
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

// Re-export argument structs
pub use args::{
    CommentAction, CommentArgs, CreateArgs, DeleteArgs, InfoArgs, InitArgs, ListArgs, MoveArgs,
    ProjectAction, ProjectArgs, ReleaseAction, ReleaseArgs, ShowArgs, UpdateArgs, UserAction,
    UserArgs,
};

// Re-export types
pub use types::{IssueRef, IssueStatusArg, IssueTypeArg};

// Re-export validators for external use
pub use validators::{validate_issue_ref, validate_project_key, validate_title};

/// Mini Board - a small issue board
///
/// Track issues in prioritized releases and reorder them by moving one
/// issue onto another. The board lives in `.miniboard/board.jsonl`.
#[derive(Parser, Debug)]
#[command(name = "miniboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new board
    ///
    /// Creates the `.miniboard/` directory with configuration and an empty
    /// data file. Run this once in your project root.
    Init(InitArgs),

    /// Show board information
    ///
    /// Displays the data file path, the default user, and record counts.
    Info(InfoArgs),

    /// Manage users
    User(UserArgs),

    /// Manage projects
    Project(ProjectArgs),

    /// Manage releases
    Release(ReleaseArgs),

    /// Create a new issue
    ///
    /// The issue goes to the bottom of its release.
    Create(CreateArgs),

    /// List issues on the board
    ///
    /// Issues are grouped by release, latest due date first, and ordered by
    /// priority within each release.
    List(ListArgs),

    /// Show an issue with its comments
    Show(ShowArgs),

    /// Update an existing issue
    ///
    /// Only provided fields are updated; other fields remain unchanged.
    Update(UpdateArgs),

    /// Delete an issue permanently
    Delete(DeleteArgs),

    /// Move an issue into another issue's place
    ///
    /// The moved issue takes the target's release and position. Issues in
    /// between shift by one; only changed placements are reported.
    Move(MoveArgs),

    /// Manage comments
    Comment(CommentArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("Mini Board issue tracker");
            println!("Use --help for more information");
            return Ok(());
        };

        if let Commands::Init(args) = command {
            return execute::execute_init(args).await;
        }

        let mut app = App::from_directory(&std::env::current_dir()?).await?;
        match command {
            Commands::Init(_) => Ok(()),
            Commands::Info(args) => execute::execute_info(&app, args, output_mode).await,
            Commands::User(args) => execute::execute_user(&mut app, args, output_mode).await,
            Commands::Project(args) => execute::execute_project(&mut app, args, output_mode).await,
            Commands::Release(args) => execute::execute_release(&mut app, args, output_mode).await,
            Commands::Create(args) => execute::execute_create(&mut app, args, output_mode).await,
            Commands::List(args) => execute::execute_list(&app, args, output_mode).await,
            Commands::Show(args) => execute::execute_show(&app, args, output_mode).await,
            Commands::Update(args) => execute::execute_update(&mut app, args, output_mode).await,
            Commands::Delete(args) => execute::execute_delete(&mut app, args, output_mode).await,
            Commands::Move(args) => execute::execute_move(&mut app, args, output_mode).await,
            Commands::Comment(args) => execute::execute_comment(&mut app, args, output_mode).await,
        }
    }
}
