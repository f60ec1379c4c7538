//! Completeness: required columns must not hold nulls.

use super::owned_columns;
use crate::error::SchemaError;
use crate::report::{CheckKind, DiscrepancyReport, Violation};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Flags every null found in a set of required columns.
///
/// Violations are ordered by column (in the order given) and then by row.
/// A column named twice is only scanned once.
///
/// # Examples
///
/// ```rust
/// use tabular_guard::checks::CompletenessCheck;
/// use tabular_guard::table::{DataType, Table, Value};
///
/// let customers = Table::builder("customers")
///     .column("name", DataType::Utf8)
///     .column("email", DataType::Utf8)
///     .row(vec![Value::from("Ana Torres"), Value::from("ana@email.com")])
///     .row(vec![Value::from("Juan Pérez"), Value::Null])
///     .build()?;
///
/// let report = CompletenessCheck::new(["name", "email"]).check(&customers)?;
/// assert_eq!(report.len(), 1);
/// # Ok::<(), tabular_guard::error::SchemaError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessCheck {
    columns: Vec<String>,
}

impl CompletenessCheck {
    /// Creates a check over the given required columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: owned_columns(columns),
        }
    }

    /// Returns the required columns as configured.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Runs the check against `table`.
    #[instrument(skip(self, table), fields(check = "completeness", table = %table.name()))]
    pub fn check(&self, table: &Table) -> Result<DiscrepancyReport, SchemaError> {
        let mut required: Vec<(&str, usize)> = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let index = table.resolve_column(name)?;
            if !required.iter().any(|&(_, seen)| seen == index) {
                required.push((name.as_str(), index));
            }
        }

        let mut violations = Vec::new();
        for &(name, col) in &required {
            for (index, row) in table.rows().enumerate() {
                if row[col].is_null() {
                    violations.push(Violation::MissingValue {
                        row: table.row_ref(index),
                        column: name.to_string(),
                    });
                }
            }
        }

        debug!(
            columns = required.len(),
            rows = table.num_rows(),
            nulls = violations.len(),
            "Completeness scan finished"
        );

        let report = DiscrepancyReport::new(CheckKind::Completeness, table.name(), violations);
        report.log_outcome();
        Ok(report)
    }
}
