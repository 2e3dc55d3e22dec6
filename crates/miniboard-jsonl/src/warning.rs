//! Non-fatal problems found while loading JSONL data.
//!
//! Resilient loading never aborts on a bad line. Each problem becomes a
//! [`Warning`] pushed into a shared [`WarningCollector`], and the caller
//! decides how loudly to report them.

use std::sync::{Arc, Mutex, PoisonError};

/// A non-fatal warning that occurred during JSONL processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The line is not valid JSON (or not the expected shape).
    MalformedJson {
        /// 1-based line number.
        line_number: usize,
        /// Decoder message.
        error: String,
    },

    /// The line is not valid UTF-8.
    InvalidUtf8 {
        /// 1-based line number.
        line_number: usize,
    },

    /// Reading stopped early, e.g. on an I/O error.
    SkippedLine {
        /// 1-based line number where reading stopped.
        line_number: usize,
        /// Why the rest was skipped.
        reason: String,
    },
}

impl Warning {
    /// Returns the line number associated with this warning.
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedJson { line_number, .. }
            | Self::InvalidUtf8 { line_number }
            | Self::SkippedLine { line_number, .. } => *line_number,
        }
    }

    /// Returns a static string identifying the warning kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::InvalidUtf8 { .. } => "invalid_utf8",
            Self::SkippedLine { .. } => "skipped_line",
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: malformed JSON: {error}")
            }
            Self::InvalidUtf8 { line_number } => {
                write!(f, "line {line_number}: invalid UTF-8")
            }
            Self::SkippedLine {
                line_number,
                reason,
            } => write!(f, "line {line_number}: skipped: {reason}"),
        }
    }
}

impl std::error::Error for Warning {}

/// A cloneable, thread-safe sink for [`Warning`]s.
///
/// Clones share the same storage, so a clone can be moved into a stream while
/// the original is kept to read the results afterwards.
///
/// ```
/// use miniboard_jsonl::{Warning, WarningCollector};
///
/// let collector = WarningCollector::new();
/// let sink = collector.clone();
/// sink.add(Warning::InvalidUtf8 { line_number: 3 });
///
/// assert_eq!(collector.len(), 1);
/// assert_eq!(collector.into_warnings()[0].line_number(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WarningCollector {
    warnings: Arc<Mutex<Vec<Warning>>>,
}

impl WarningCollector {
    /// Creates a new empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning.
    pub fn add(&self, warning: Warning) {
        tracing::debug!(kind = warning.kind(), line = warning.line_number(), "jsonl warning");
        self.lock().push(warning);
    }

    /// Number of warnings collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the collected warnings.
    #[must_use]
    pub fn warnings(&self) -> Vec<Warning> {
        self.lock().clone()
    }

    /// Consumes the collector and returns the warnings in insertion order.
    ///
    /// Moves the data out when this is the last handle, clones otherwise.
    #[must_use]
    pub fn into_warnings(self) -> Vec<Warning> {
        match Arc::try_unwrap(self.warnings) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    // A panic while holding the lock cannot leave a Vec half-pushed, so the
    // poisoned data is still usable.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Warning>> {
        self.warnings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_and_detail() {
        let warning = Warning::MalformedJson {
            line_number: 5,
            error: "unexpected end of input".to_string(),
        };
        let text = warning.to_string();
        assert!(text.contains("line 5"));
        assert!(text.contains("unexpected end of input"));
    }

    #[test]
    fn kind_names_each_variant() {
        assert_eq!(Warning::InvalidUtf8 { line_number: 1 }.kind(), "invalid_utf8");
        assert_eq!(
            Warning::SkippedLine {
                line_number: 1,
                reason: String::new()
            }
            .kind(),
            "skipped_line"
        );
    }

    #[test]
    fn clones_share_state() {
        let collector = WarningCollector::new();
        let clone = collector.clone();
        clone.add(Warning::InvalidUtf8 { line_number: 2 });
        assert_eq!(collector.len(), 1);
        assert!(!collector.is_empty());
    }

    #[test]
    fn into_warnings_with_live_clone_copies() {
        let collector = WarningCollector::new();
        let clone = collector.clone();
        collector.add(Warning::InvalidUtf8 { line_number: 1 });

        let taken = collector.into_warnings();
        assert_eq!(taken.len(), 1);
        assert_eq!(clone.warnings(), taken);
    }

    #[test]
    fn preserves_insertion_order() {
        let collector = WarningCollector::new();
        for line_number in [4, 1, 9] {
            collector.add(Warning::InvalidUtf8 { line_number });
        }
        let lines: Vec<usize> = collector
            .into_warnings()
            .iter()
            .map(Warning::line_number)
            .collect();
        assert_eq!(lines, vec![4, 1, 9]);
    }

    #[test]
    fn collector_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WarningCollector>();
    }
}
