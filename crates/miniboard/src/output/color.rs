//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:   green   (done status, features, completed actions)
//!   - Warning/Active: yellow  (doing status, moved issues)
//!   - Error:          red     (bugs, failures)
//!   - Info/Reference: cyan    (issue references, ids)
//!   - Accent:         magenta (release names)
//!   - Muted:          dimmed  (field labels, unchanged values)
//!   - Emphasis:       bold    (section headers, top priority)

use crate::domain::{IssueStatus, IssueType};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
#[must_use]
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
#[must_use]
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
#[must_use]
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply color to status text based on issue status.
pub(crate) fn colorize_status(status: IssueStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    if !config.use_colors {
        return text;
    }
    match status {
        IssueStatus::Todo => text.white().to_string(),
        IssueStatus::Doing => text.yellow().to_string(),
        IssueStatus::Done => text.green().to_string(),
    }
}

/// Priority as shown on the board, e.g. `#0`. The top of a release is bold.
pub(crate) fn colorize_priority(priority: u32, config: &OutputConfig) -> String {
    let text = format!("#{priority}");
    if !config.use_colors {
        return text;
    }
    if priority == 0 {
        text.bold().to_string()
    } else {
        text
    }
}

/// Colorize an issue reference or id (cyan).
pub(crate) fn colorize_ref(reference: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return reference.to_string();
    }
    reference.cyan().to_string()
}

/// Colorize a release name (magenta).
pub(crate) fn colorize_release(name: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return name.to_string();
    }
    name.magenta().to_string()
}

/// Get a colored status icon, with ASCII fallback support.
pub(crate) fn colored_status_icon(status: IssueStatus, config: &OutputConfig) -> String {
    let icon = if config.use_ascii {
        match status {
            IssueStatus::Todo => "o",
            IssueStatus::Doing => ">",
            IssueStatus::Done => "+",
        }
    } else {
        match status {
            IssueStatus::Todo => "○",
            IssueStatus::Doing => "▶",
            IssueStatus::Done => "✓",
        }
    };

    if !config.use_colors {
        return icon.to_string();
    }

    match status {
        IssueStatus::Todo => icon.white().to_string(),
        IssueStatus::Doing => icon.yellow().to_string(),
        IssueStatus::Done => icon.green().to_string(),
    }
}

/// Get a colored type icon, with ASCII fallback support.
pub(crate) fn colored_type_icon(issue_type: IssueType, config: &OutputConfig) -> String {
    let icon = match (issue_type, config.use_ascii) {
        (IssueType::Bug, true) => "*",
        (IssueType::Feature, true) => "+",
        (IssueType::Bug, false) => "●",
        (IssueType::Feature, false) => "★",
    };
    if !config.use_colors {
        return icon.to_string();
    }
    match issue_type {
        IssueType::Bug => icon.red().to_string(),
        IssueType::Feature => icon.green().to_string(),
    }
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> OutputConfig {
        OutputConfig::new(80, false, false)
    }

    fn ascii() -> OutputConfig {
        OutputConfig::new(80, true, false)
    }

    #[test]
    fn plain_config_leaves_text_untouched() {
        let config = plain();
        assert_eq!(success("ok", &config), "ok");
        assert_eq!(error("bad", &config), "bad");
        assert_eq!(warning("hmm", &config), "hmm");
        assert_eq!(colorize_ref("MB-1", &config), "MB-1");
        assert_eq!(colorize_status(IssueStatus::Doing, &config), "doing");
    }

    #[test]
    fn priority_is_shown_with_hash() {
        assert_eq!(colorize_priority(0, &plain()), "#0");
        assert_eq!(colorize_priority(12, &plain()), "#12");
    }

    #[test]
    fn ascii_icons() {
        let config = ascii();
        assert_eq!(colored_status_icon(IssueStatus::Todo, &config), "o");
        assert_eq!(colored_status_icon(IssueStatus::Done, &config), "+");
        assert_eq!(colored_type_icon(IssueType::Bug, &config), "*");
    }

    #[test]
    fn unicode_icons() {
        let config = plain();
        assert_eq!(colored_status_icon(IssueStatus::Doing, &config), "▶");
        assert_eq!(colored_type_icon(IssueType::Feature, &config), "★");
    }
}
