//! Uniqueness of a key over the rows of one table.

use super::owned_columns;
use crate::error::SchemaError;
use crate::report::{CheckKind, DiscrepancyReport, RowRef, Violation};
use crate::table::{KeyTuple, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Flags key tuples shared by more than one row.
///
/// Rows with a null in any key column are left out of the grouping. Each
/// duplicated key yields one [`Violation::DuplicateKey`] listing all rows that
/// share it; groups are reported in the order their key first appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniquenessCheck {
    columns: Vec<String>,
}

impl UniquenessCheck {
    /// Creates a check over the given key columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: owned_columns(columns),
        }
    }

    /// Returns the key columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Runs the check against `table`.
    #[instrument(skip(self, table), fields(check = "uniqueness", table = %table.name()))]
    pub fn check(&self, table: &Table) -> Result<DiscrepancyReport, SchemaError> {
        if self.columns.is_empty() {
            return Err(SchemaError::EmptyKey {
                check: CheckKind::Uniqueness.to_string(),
            });
        }
        let key_columns = table.resolve_columns(&self.columns)?;

        let mut groups: Vec<(KeyTuple, Vec<RowRef>)> = Vec::new();
        let mut positions: HashMap<KeyTuple, usize> = HashMap::new();
        let mut excluded = 0usize;

        for index in 0..table.num_rows() {
            let key = table.key_at(index, &key_columns);
            if key.has_null() {
                excluded += 1;
                continue;
            }
            match positions.get(&key) {
                Some(&group) => groups[group].1.push(table.row_ref(index)),
                None => {
                    positions.insert(key.clone(), groups.len());
                    groups.push((key, vec![table.row_ref(index)]));
                }
            }
        }

        debug!(
            rows = table.num_rows(),
            excluded,
            distinct = groups.len(),
            "Uniqueness grouping finished"
        );

        let violations = groups
            .into_iter()
            .filter(|(_, rows)| rows.len() > 1)
            .map(|(key, rows)| Violation::DuplicateKey {
                columns: self.columns.clone(),
                key,
                rows,
            })
            .collect();

        let report = DiscrepancyReport::new(CheckKind::Uniqueness, table.name(), violations);
        report.log_outcome();
        Ok(report)
    }
}
