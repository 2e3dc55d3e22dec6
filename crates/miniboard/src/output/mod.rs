//! Output formatting for CLI commands.
//!
//! Every printer has a text form for people and a JSON form for scripts.
//! Text rendering goes through generic writers so it can be tested against a
//! buffer; the public functions pick the mode and write to stdout.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)

pub mod color;

use crate::domain::{
    Comment, Issue, IssueId, IssuePage, Project, ProjectId, Release, ReleaseId, User, UserId,
};
use crate::reorder::PriorityUpdate;
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::io::{self, Write};

pub use color::{error, success, warning};

use color::{
    bold, colored_status_icon, colored_type_icon, colorize_priority, colorize_ref,
    colorize_release, colorize_status, dimmed,
};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;

/// Configuration for output formatting.
///
/// Controls terminal width limits, ASCII fallback mode, and color output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `MINIBOARD_MAX_WIDTH`: Maximum content width (default: 80)
    /// - `MINIBOARD_ASCII`: "1" or "true" for ASCII-only icons (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `MINIBOARD_COLOR`: "0" or "false" to disable colors (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_width = match lookup("MINIBOARD_MAX_WIDTH") {
            Some(s) if !s.is_empty() => s.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    env_var = "MINIBOARD_MAX_WIDTH",
                    value = %s,
                    default = DEFAULT_MAX_CONTENT_WIDTH,
                    "Invalid value, using default"
                );
                DEFAULT_MAX_CONTENT_WIDTH
            }),
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match lookup("MINIBOARD_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "MINIBOARD_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // https://no-color.org/, plus MINIBOARD_COLOR for explicit control
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("MINIBOARD_COLOR")
                .is_none_or(|v| v != "0" && !v.eq_ignore_ascii_case("false"));

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Get the current terminal width, falling back to default if detection fails.
fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map_or(usize::from(DEFAULT_TERMINAL_WIDTH), |(w, _)| usize::from(w.0))
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Display Names
// ============================================================================

/// Lookup tables that turn ids into the names people recognise.
#[derive(Debug, Default)]
pub struct Names {
    project_keys: HashMap<ProjectId, String>,
    releases: HashMap<ReleaseId, Release>,
    usernames: HashMap<UserId, String>,
    issue_projects: HashMap<IssueId, ProjectId>,
}

impl Names {
    /// Build lookups from the listed records.
    #[must_use]
    pub fn new(projects: &[Project], releases: &[Release], users: &[User]) -> Self {
        Self {
            project_keys: projects.iter().map(|p| (p.id, p.key.clone())).collect(),
            releases: releases.iter().map(|r| (r.id, r.clone())).collect(),
            usernames: users.iter().map(|u| (u.id, u.username.clone())).collect(),
            issue_projects: HashMap::new(),
        }
    }

    /// Also remember which project each issue belongs to.
    #[must_use]
    pub fn with_issues<'a>(mut self, issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        self.issue_projects
            .extend(issues.into_iter().map(|i| (i.id, i.project_id)));
        self
    }

    /// `MB-12` when the project is known, `#12` otherwise.
    #[must_use]
    pub fn issue_ref(&self, id: IssueId, project_id: Option<ProjectId>) -> String {
        project_id
            .or_else(|| self.issue_projects.get(&id).copied())
            .and_then(|p| self.project_keys.get(&p))
            .map_or_else(|| format!("#{id}"), |key| format!("{key}-{id}"))
    }

    fn release_name(&self, id: ReleaseId) -> String {
        self.releases
            .get(&id)
            .map_or_else(|| format!("release {id}"), |r| r.name.clone())
    }

    fn username(&self, id: UserId) -> String {
        self.usernames
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("user {id}"))
    }
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a JSON-formatted result for any serializable value
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

/// Print a simple message
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print one issue as a single line (after create or update)
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn print_issue(issue: &Issue, names: &Names, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(issue),
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            write_issue_line(&mut io::stdout().lock(), issue, names, &config)
        }
    }
}

/// Print a page of issues grouped by release
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn print_issue_page(page: &IssuePage, names: &Names, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(page),
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            write_issue_page(&mut io::stdout().lock(), page, names, &config)
        }
    }
}

/// Print an issue with full details and its comments (for `show`)
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn print_issue_details(
    issue: &Issue,
    comments: &[Comment],
    names: &Names,
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Json => {
            #[derive(Serialize)]
            struct Details<'a> {
                issue: &'a Issue,
                comments: &'a [Comment],
            }
            print_json(&Details { issue, comments })
        }
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            let width = get_terminal_width().min(config.max_width);
            write_issue_details(&mut io::stdout().lock(), issue, comments, names, width, &config)
        }
    }
}

/// Print the placements a move changed
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn print_moves(updates: &[PriorityUpdate], names: &Names, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(&updates),
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            write_moves(&mut io::stdout().lock(), updates, names, &config)
        }
    }
}

/// Print users
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn print_users(users: &[User], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(&users),
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            write_users(&mut io::stdout().lock(), users, &config)
        }
    }
}

/// Print projects
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn print_projects(projects: &[Project], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(&projects),
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            let width = get_terminal_width().min(config.max_width);
            write_projects(&mut io::stdout().lock(), projects, width, &config)
        }
    }
}

/// Print releases
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn print_releases(releases: &[Release], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(&releases),
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            write_releases(&mut io::stdout().lock(), releases, &config)
        }
    }
}

/// Print the comments on an issue
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn print_comments(comments: &[Comment], names: &Names, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(&comments),
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            let width = get_terminal_width().min(config.max_width);
            let mut handle = io::stdout().lock();
            if comments.is_empty() {
                return writeln!(handle, "No comments.");
            }
            write_comments(&mut handle, comments, names, width, &config)
        }
    }
}

// ============================================================================
// Text Formatting
// ============================================================================

fn write_issue_line<W: Write>(
    w: &mut W,
    issue: &Issue,
    names: &Names,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}  {}  {}  {}  {}",
        colored_status_icon(issue.status, config),
        colorize_ref(&names.issue_ref(issue.id, Some(issue.project_id)), config),
        colored_type_icon(issue.issue_type, config),
        colorize_priority(issue.priority, config),
        issue.title,
        dimmed(&format!("[{}]", names.release_name(issue.release_id)), config),
    )
}

fn write_issue_page<W: Write>(
    w: &mut W,
    page: &IssuePage,
    names: &Names,
    config: &OutputConfig,
) -> io::Result<()> {
    if page.issues.is_empty() {
        if page.total == 0 {
            writeln!(w, "No issues found.")?;
        } else {
            writeln!(w, "No issues on this page ({} in total).", page.total)?;
        }
        return Ok(());
    }

    writeln!(
        w,
        "Showing {} of {} issue(s):",
        page.issues.len(),
        page.total
    )?;

    let mut current_release = None;
    for issue in &page.issues {
        if current_release != Some(issue.release_id) {
            current_release = Some(issue.release_id);
            writeln!(w)?;
            let due = names
                .releases
                .get(&issue.release_id)
                .map(|r| format!(" (due {})", r.due_date))
                .unwrap_or_default();
            writeln!(
                w,
                "{}{}",
                bold(&colorize_release(&names.release_name(issue.release_id), config), config),
                dimmed(&due, config)
            )?;
        }
        write!(w, "  ")?;
        write_issue_line(w, issue, names, config)?;
    }
    Ok(())
}

fn write_issue_details<W: Write>(
    w: &mut W,
    issue: &Issue,
    comments: &[Comment],
    names: &Names,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}: {}",
        colored_status_icon(issue.status, config),
        colorize_ref(&names.issue_ref(issue.id, Some(issue.project_id)), config),
        issue.title
    )?;

    writeln!(
        w,
        "{}  {} {}    {}  {}    {}  {}    {}  {}",
        dimmed("Type:", config),
        colored_type_icon(issue.issue_type, config),
        issue.issue_type,
        dimmed("Status:", config),
        colorize_status(issue.status, config),
        dimmed("Points:", config),
        issue.points,
        dimmed("Priority:", config),
        colorize_priority(issue.priority, config)
    )?;
    writeln!(
        w,
        "{} {}    {} {}",
        dimmed("Release:", config),
        colorize_release(&names.release_name(issue.release_id), config),
        dimmed("Author:", config),
        names.username(issue.author_id)
    )?;
    writeln!(
        w,
        "{} {}    {} {}",
        dimmed("Created:", config),
        issue.created_at.format("%Y-%m-%d %H:%M"),
        dimmed("Updated:", config),
        issue.updated_at.format("%Y-%m-%d %H:%M")
    )?;

    if !issue.description.trim().is_empty() {
        writeln!(w)?;
        writeln!(w, "{}:", bold("Description", config))?;
        for line in wrap_text(&issue.description, width.saturating_sub(2)) {
            writeln!(w, "  {line}")?;
        }
    }

    if !comments.is_empty() {
        writeln!(w)?;
        writeln!(w, "{} ({}):", bold("Comments", config), comments.len())?;
        write_comments(w, comments, names, width, config)?;
    }
    Ok(())
}

fn write_comments<W: Write>(
    w: &mut W,
    comments: &[Comment],
    names: &Names,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    for comment in comments {
        writeln!(
            w,
            "  {} {} {}",
            colorize_ref(&format!("[{}]", comment.id), config),
            names.username(comment.author_id),
            dimmed(&comment.created_at.format("%Y-%m-%d %H:%M").to_string(), config)
        )?;
        for line in wrap_text(&comment.content, width.saturating_sub(4)) {
            writeln!(w, "    {line}")?;
        }
    }
    Ok(())
}

fn write_moves<W: Write>(
    w: &mut W,
    updates: &[PriorityUpdate],
    names: &Names,
    config: &OutputConfig,
) -> io::Result<()> {
    if updates.is_empty() {
        return writeln!(w, "Nothing to move.");
    }
    writeln!(w, "{} {} issue(s):", success("Reordered", config), updates.len())?;
    for update in updates {
        writeln!(
            w,
            "  {} -> {} {}",
            colorize_ref(&names.issue_ref(update.issue_id, None), config),
            colorize_release(&names.release_name(update.release_id), config),
            colorize_priority(update.priority, config)
        )?;
    }
    Ok(())
}

fn write_users<W: Write>(w: &mut W, users: &[User], config: &OutputConfig) -> io::Result<()> {
    if users.is_empty() {
        return writeln!(w, "No users.");
    }
    for user in users {
        writeln!(
            w,
            "{}  {}",
            colorize_ref(&format!("{:>3}", user.id), config),
            user.username
        )?;
    }
    Ok(())
}

fn write_projects<W: Write>(
    w: &mut W,
    projects: &[Project],
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    if projects.is_empty() {
        return writeln!(w, "No projects.");
    }
    for project in projects {
        writeln!(
            w,
            "{}  {}  {}",
            colorize_ref(&format!("{:>3}", project.id), config),
            bold(&format!("{:<10}", project.key), config),
            project.name
        )?;
        for line in wrap_text(&project.description, width.saturating_sub(6)) {
            writeln!(w, "      {}", dimmed(&line, config))?;
        }
    }
    Ok(())
}

fn write_releases<W: Write>(
    w: &mut W,
    releases: &[Release],
    config: &OutputConfig,
) -> io::Result<()> {
    if releases.is_empty() {
        return writeln!(w, "No releases.");
    }
    for release in releases {
        writeln!(
            w,
            "{}  {}  {}",
            colorize_ref(&format!("{:>3}", release.id), config),
            dimmed(&release.due_date.to_string(), config),
            colorize_release(&release.name, config)
        )?;
    }
    Ok(())
}

/// Wrap text to fit within a given width, preserving existing line breaks.
/// Uses textwrap to handle edge cases like long words (URLs, file paths).
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, max_width)
                    .into_iter()
                    .map(std::borrow::Cow::into_owned)
                    .collect()
            }
        })
        .collect()
}
