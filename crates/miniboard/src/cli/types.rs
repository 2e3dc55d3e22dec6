//! CLI value enums and domain type conversions.
//!
//! This module contains the value enums used for CLI argument parsing,
//! their conversions to domain types, and the issue reference syntax.

use clap::ValueEnum;
use std::fmt;

use crate::domain::{IssueId, IssueStatus, IssueType};

// ============================================================================
// Value Enums
// ============================================================================

/// Issue type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueTypeArg {
    /// Something is broken
    Bug,
    /// New functionality
    Feature,
}

impl fmt::Display for IssueTypeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bug => write!(f, "bug"),
            Self::Feature => write!(f, "feature"),
        }
    }
}

impl From<IssueTypeArg> for IssueType {
    fn from(arg: IssueTypeArg) -> Self {
        match arg {
            IssueTypeArg::Bug => IssueType::Bug,
            IssueTypeArg::Feature => IssueType::Feature,
        }
    }
}

/// Issue status for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStatusArg {
    /// Not started
    Todo,
    /// In progress
    #[value(alias = "in-progress")]
    Doing,
    /// Finished
    Done,
}

impl fmt::Display for IssueStatusArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Todo => write!(f, "todo"),
            Self::Doing => write!(f, "doing"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl From<IssueStatusArg> for IssueStatus {
    fn from(arg: IssueStatusArg) -> Self {
        match arg {
            IssueStatusArg::Todo => IssueStatus::Todo,
            IssueStatusArg::Doing => IssueStatus::Doing,
            IssueStatusArg::Done => IssueStatus::Done,
        }
    }
}

// ============================================================================
// Issue References
// ============================================================================

/// An issue as typed on the command line: `MB-12`, `#12` or `12`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    /// Project key, upper-cased, when the reference carried one
    pub key: Option<String>,
    /// The issue id
    pub id: IssueId,
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{key}-{}", self.id),
            None => write!(f, "#{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_to_domain() {
        assert_eq!(IssueType::from(IssueTypeArg::Bug), IssueType::Bug);
        assert_eq!(IssueStatus::from(IssueStatusArg::Doing), IssueStatus::Doing);
    }

    #[test]
    fn display_matches_value_names() {
        assert_eq!(IssueTypeArg::Feature.to_string(), "feature");
        assert_eq!(IssueStatusArg::Done.to_string(), "done");
    }

    #[test]
    fn issue_ref_display() {
        let keyed = IssueRef {
            key: Some("MB".to_string()),
            id: IssueId::new(12),
        };
        let bare = IssueRef {
            key: None,
            id: IssueId::new(12),
        };
        assert_eq!(keyed.to_string(), "MB-12");
        assert_eq!(bare.to_string(), "#12");
    }
}
