//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.
//! Most delegate to the domain validators so the rules live in one place.

use chrono::NaiveDate;

use super::types::IssueRef;
use crate::domain::{self, IssueId};

/// Validate a username.
pub fn validate_username(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    domain::validate_username(trimmed)?;
    Ok(trimmed.to_string())
}

/// Validate a project key. Keys are stored upper-case.
pub fn validate_project_key(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    domain::validate_project_key(trimmed)?;
    Ok(trimmed.to_ascii_uppercase())
}

/// Validate an issue title.
pub fn validate_title(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    domain::validate_title("Title", trimmed)?;
    Ok(trimmed.to_string())
}

/// Validate a project or release name.
pub fn validate_name(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    domain::validate_title("Name", trimmed)?;
    Ok(trimmed.to_string())
}

/// Validate comment content.
pub fn validate_comment(s: &str) -> Result<String, String> {
    domain::validate_comment(s)?;
    Ok(s.trim().to_string())
}

/// Parse a due date in `YYYY-MM-DD` form.
pub fn validate_due_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {e} (expected YYYY-MM-DD)", s.trim()))
}

/// Parse an issue reference.
///
/// Accepted forms: `MB-12` (project key and id), `#12` and `12`.
pub fn validate_issue_ref(s: &str) -> Result<IssueRef, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Issue reference cannot be empty".to_string());
    }

    let (key, number) = match s.rsplit_once('-') {
        Some((key, number)) => {
            domain::validate_project_key(key)
                .map_err(|e| format!("Invalid issue reference '{s}': {e}"))?;
            (Some(key.to_ascii_uppercase()), number)
        }
        None => (None, s.strip_prefix('#').unwrap_or(s)),
    };

    let id = number.parse::<IssueId>().map_err(|_| {
        format!("Invalid issue reference '{s}'. Expected KEY-NUMBER (e.g., MB-12) or a number")
    })?;

    Ok(IssueRef { key, id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::keyed("MB-12", Some("MB"), 12)]
    #[case::lower_case_key("mb-3", Some("MB"), 3)]
    #[case::hash("#7", None, 7)]
    #[case::bare(" 42 ", None, 42)]
    fn issue_refs_parse(#[case] input: &str, #[case] key: Option<&str>, #[case] id: u64) {
        let parsed = validate_issue_ref(input).unwrap();
        assert_eq!(parsed.key.as_deref(), key);
        assert_eq!(parsed.id, IssueId::new(id));
    }

    #[rstest]
    #[case::empty("")]
    #[case::no_number("MB-")]
    #[case::bad_key("M-1")]
    #[case::negative("-1")]
    #[case::words("twelve")]
    fn issue_refs_reject(#[case] input: &str) {
        assert!(validate_issue_ref(input).is_err());
    }

    #[test]
    fn project_key_is_upper_cased() {
        assert_eq!(validate_project_key(" mb ").unwrap(), "MB");
        assert!(validate_project_key("m").is_err());
    }

    #[test]
    fn titles_are_trimmed_and_checked() {
        assert_eq!(validate_title("  Fix it ").unwrap(), "Fix it");
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(201)).is_err());
    }

    #[test]
    fn due_dates() {
        assert_eq!(
            validate_due_date("2030-01-31").unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 31).unwrap()
        );
        assert!(validate_due_date("31/01/2030").is_err());
    }

    #[test]
    fn usernames_and_comments() {
        assert_eq!(validate_username(" alice ").unwrap(), "alice");
        assert!(validate_username("alice smith").is_err());
        assert!(validate_comment("  ").is_err());
    }
}
