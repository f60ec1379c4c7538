//! Results of a suite run.

use super::Level;
use crate::error::Result;
use crate::report::DiscrepancyReport;
use serde::{Deserialize, Serialize};

/// Counters collected during a suite run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuiteMetrics {
    /// Number of checks executed
    pub total_checks: usize,
    /// Checks whose report is clean
    pub clean_checks: usize,
    /// Checks that found at least one violation
    pub failed_checks: usize,
    /// Violations across every report
    pub total_violations: usize,
    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
}

impl SuiteMetrics {
    /// Returns the share of clean checks as a percentage (0.0 to 100.0).
    pub fn success_rate(&self) -> f64 {
        if self.total_checks == 0 {
            100.0
        } else {
            (self.clean_checks as f64 / self.total_checks as f64) * 100.0
        }
    }
}

/// The report of one named check within a suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: String,
    pub level: Level,
    pub report: DiscrepancyReport,
}

impl CheckOutcome {
    /// Returns true if the check found nothing.
    pub fn is_clean(&self) -> bool {
        self.report.is_clean()
    }

    /// Returns true if this outcome fails the suite.
    pub fn is_blocking(&self) -> bool {
        self.level == Level::Error && !self.report.is_clean()
    }
}

/// The outcome of [`ValidationSuite::run`](super::ValidationSuite::run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteResult {
    pub suite_name: String,
    pub outcomes: Vec<CheckOutcome>,
    pub metrics: SuiteMetrics,
}

impl SuiteResult {
    /// Returns true unless an `error` level check found violations.
    pub fn is_success(&self) -> bool {
        !self.outcomes.iter().any(CheckOutcome::is_blocking)
    }

    /// Returns the outcome of the check with this name.
    pub fn outcome(&self, name: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    /// Returns every non-clean outcome at or above `level`.
    pub fn failures_at_least(&self, level: Level) -> Vec<&CheckOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_clean() && o.level.is_at_least(level))
            .collect()
    }

    /// Formats the result as compact JSON.
    pub fn to_json(&self) -> Result<String> {
        use crate::formatters::{JsonFormatter, ReportFormatter};
        JsonFormatter::new().format_suite(self)
    }

    /// Formats the result for a terminal.
    pub fn to_human(&self) -> Result<String> {
        use crate::formatters::{HumanFormatter, ReportFormatter};
        HumanFormatter::new().format_suite(self)
    }

    /// Formats the result using a custom formatter.
    pub fn format_with<F: crate::formatters::ReportFormatter>(&self, formatter: &F) -> Result<String> {
        formatter.format_suite(self)
    }
}
