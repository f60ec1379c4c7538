//! Severity levels for suite checks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How much a failing check matters to the suite.
///
/// Only checks at [`Level::Error`] make a suite run unsuccessful; findings of
/// `Warning` and `Info` checks are reported but do not fail the run.
/// Levels are ordered by severity: `Error > Warning > Info`.
///
/// # Examples
///
/// ```rust
/// use tabular_guard::core::Level;
///
/// assert!(Level::Error > Level::Warning);
/// assert_eq!(Level::default(), Level::Warning);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Observations that need no action
    Info = 0,
    /// Findings that should be reviewed
    #[default]
    Warning = 1,
    /// Findings that block the pipeline
    Error = 2,
}

impl Level {
    /// Returns the string representation of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }

    /// Checks if this level is at least as severe as another level.
    pub fn is_at_least(&self, other: Level) -> bool {
        *self >= other
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
