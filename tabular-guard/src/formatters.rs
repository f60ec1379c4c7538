//! Rendering reports and suite results.
//!
//! Formatters turn a [`DiscrepancyReport`] or a [`SuiteResult`] into a
//! `String`; they never print. [`HumanFormatter`] is meant for terminals and
//! logs, [`JsonFormatter`] for other tools.
//!
//! # Examples
//!
//! ```rust
//! use tabular_guard::formatters::{FormatterConfig, HumanFormatter, ReportFormatter};
//! use tabular_guard::report::{CheckKind, DiscrepancyReport};
//!
//! let report = DiscrepancyReport::new(CheckKind::Completeness, "customers", vec![]);
//! let text = HumanFormatter::with_config(FormatterConfig::minimal()).format_report(&report)?;
//! assert!(text.contains("customers"));
//! # Ok::<(), tabular_guard::error::GuardError>(())
//! ```

use crate::core::{Level, SuiteResult};
use crate::error::Result;
use crate::logging::truncate_field;
use crate::report::DiscrepancyReport;
use serde_json::Value as JsonValue;
use std::fmt::Write;

/// Options shared by every formatter.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include suite metrics
    pub include_metrics: bool,
    /// Include individual violations
    pub include_violations: bool,
    /// Maximum number of violations shown per report (`None` for all)
    pub max_violations: Option<usize>,
    /// Colorize human output with ANSI escapes
    pub use_colors: bool,
    /// Longest violation line in human output before it is truncated
    pub max_field_length: usize,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_metrics: true,
            include_violations: true,
            max_violations: None,
            use_colors: true,
            max_field_length: 256,
        }
    }
}

impl FormatterConfig {
    /// Summary only.
    pub fn minimal() -> Self {
        Self {
            include_metrics: true,
            include_violations: false,
            max_violations: Some(0),
            use_colors: false,
            max_field_length: 128,
        }
    }

    /// Everything, untruncated.
    pub fn detailed() -> Self {
        Self {
            max_field_length: usize::MAX,
            ..Self::default()
        }
    }

    /// Plain text with bounded output for CI logs.
    pub fn ci() -> Self {
        Self {
            include_metrics: true,
            include_violations: true,
            max_violations: Some(50),
            use_colors: false,
            max_field_length: 256,
        }
    }

    pub fn with_metrics(mut self, include: bool) -> Self {
        self.include_metrics = include;
        self
    }

    pub fn with_violations(mut self, include: bool) -> Self {
        self.include_violations = include;
        self
    }

    pub fn with_max_violations(mut self, max: usize) -> Self {
        self.max_violations = Some(max);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn shown(&self, total: usize) -> usize {
        if !self.include_violations {
            return 0;
        }
        self.max_violations.map_or(total, |max| max.min(total))
    }
}

/// Renders reports and suite results.
///
/// ```rust
/// use tabular_guard::core::SuiteResult;
/// use tabular_guard::formatters::ReportFormatter;
/// use tabular_guard::report::DiscrepancyReport;
///
/// struct CountFormatter;
///
/// impl ReportFormatter for CountFormatter {
///     fn format_report(&self, report: &DiscrepancyReport) -> tabular_guard::error::Result<String> {
///         Ok(format!("{}: {}", report.check(), report.len()))
///     }
///
///     fn format_suite(&self, result: &SuiteResult) -> tabular_guard::error::Result<String> {
///         Ok(format!("{}: {}", result.suite_name, result.metrics.total_violations))
///     }
/// }
/// ```
pub trait ReportFormatter {
    /// Formats a single report.
    fn format_report(&self, report: &DiscrepancyReport) -> Result<String>;

    /// Formats the result of a suite run.
    fn format_suite(&self, result: &SuiteResult) -> Result<String>;
}

/// Serializes results as JSON.
///
/// The output matches the `Serialize` form of the input, except that
/// violation lists are cut to `max_violations` (adding `omitted_violations`)
/// and `metrics` is dropped when `include_metrics` is false.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a compact JSON formatter.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: false,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: false,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn render(&self, value: &JsonValue) -> Result<String> {
        Ok(if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        })
    }

    fn trim_report(&self, report: &mut JsonValue) {
        if let Some(violations) = report.get_mut("violations").and_then(JsonValue::as_array_mut) {
            let total = violations.len();
            let shown = self.config.shown(total);
            if shown < total {
                violations.truncate(shown);
                report["omitted_violations"] = JsonValue::from(total - shown);
            }
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format_report(&self, report: &DiscrepancyReport) -> Result<String> {
        let mut value = serde_json::to_value(report)?;
        self.trim_report(&mut value);
        self.render(&value)
    }

    fn format_suite(&self, result: &SuiteResult) -> Result<String> {
        let mut value = serde_json::to_value(result)?;
        if let Some(outcomes) = value.get_mut("outcomes").and_then(JsonValue::as_array_mut) {
            for outcome in outcomes {
                if let Some(report) = outcome.get_mut("report") {
                    self.trim_report(report);
                }
            }
        }
        if !self.config.include_metrics {
            if let Some(object) = value.as_object_mut() {
                object.remove("metrics");
            }
        }
        value["success"] = JsonValue::from(result.is_success());
        self.render(&value)
    }
}

/// Renders results as indented plain text.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn paint(&self, text: &str, color: &str) -> String {
        if self.config.use_colors {
            format!("\x1b[{color}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn write_report(&self, out: &mut String, report: &DiscrepancyReport, indent: &str) -> Result<()> {
        let status = if report.is_clean() {
            self.paint("clean", "32")
        } else {
            self.paint(&format!("{} violation(s)", report.len()), "31")
        };
        writeln!(out, "{indent}{} on {}: {status}", report.check(), report.subject())?;

        let shown = self.config.shown(report.len());
        for violation in &report.violations()[..shown] {
            let line = truncate_field(&violation.to_string(), self.config.max_field_length);
            writeln!(out, "{indent}  - [{}] {line}", violation.kind())?;
        }
        if self.config.include_violations && shown < report.len() {
            writeln!(out, "{indent}  ... and {} more", report.len() - shown)?;
        }
        Ok(())
    }
}

impl ReportFormatter for HumanFormatter {
    fn format_report(&self, report: &DiscrepancyReport) -> Result<String> {
        let mut output = String::new();
        self.write_report(&mut output, report, "")?;
        Ok(output)
    }

    fn format_suite(&self, result: &SuiteResult) -> Result<String> {
        let mut output = String::new();

        let verdict = if result.is_success() {
            self.paint("Validation PASSED", "32")
        } else {
            self.paint("Validation FAILED", "31")
        };
        writeln!(output, "{verdict}")?;
        writeln!(output, "Suite: {}", result.suite_name)?;

        if self.config.include_metrics {
            let metrics = &result.metrics;
            writeln!(output)?;
            writeln!(output, "Summary:")?;
            writeln!(output, "   Total Checks: {}", metrics.total_checks)?;
            writeln!(output, "   Clean: {}", metrics.clean_checks)?;
            writeln!(output, "   With violations: {}", metrics.failed_checks)?;
            writeln!(output, "   Violations: {}", metrics.total_violations)?;
            writeln!(output, "   Success Rate: {:.1}%", metrics.success_rate())?;
            writeln!(output, "   Execution Time: {}ms", metrics.execution_time_ms)?;
        }

        writeln!(output)?;
        for outcome in &result.outcomes {
            let tag = match outcome.level {
                Level::Error => self.paint("ERROR", "31"),
                Level::Warning => self.paint("WARN", "33"),
                Level::Info => self.paint("INFO", "34"),
            };
            writeln!(output, "[{tag}] {}", outcome.name)?;
            self.write_report(&mut output, &outcome.report, "   ")?;
        }
        Ok(output)
    }
}
