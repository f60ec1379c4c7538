//! Referential integrity between a child and a parent table.

use super::{owned_columns, validate_key_pair};
use crate::error::SchemaError;
use crate::report::{CheckKind, DiscrepancyReport, Violation};
use crate::table::{KeyTuple, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Flags child rows whose foreign key matches no parent row.
///
/// Child and parent key columns are matched by position. A child row with a
/// null in any key column is never an orphan, and a key matched by several
/// parent rows is not a problem for this check.
///
/// # Examples
///
/// ```rust
/// use tabular_guard::checks::ReferentialIntegrityCheck;
/// use tabular_guard::table::{DataType, Table, Value};
///
/// let customers = Table::builder("customers")
///     .column("customer_id", DataType::Int64)
///     .rows((1i64..=5).map(|id| vec![Value::from(id)]))
///     .build()?;
/// let transactions = Table::builder("transactions")
///     .column("transaction_id", DataType::Int64)
///     .column("customer_id", DataType::Int64)
///     .natural_key(["transaction_id"])
///     .row(vec![Value::from(100i64), Value::from(1i64)])
///     .row(vec![Value::from(104i64), Value::from(6i64)])
///     .build()?;
///
/// let report = ReferentialIntegrityCheck::new(["customer_id"], ["customer_id"])
///     .check(&transactions, &customers)?;
/// assert_eq!(report.len(), 1);
/// # Ok::<(), tabular_guard::error::SchemaError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferentialIntegrityCheck {
    child_columns: Vec<String>,
    parent_columns: Vec<String>,
}

impl ReferentialIntegrityCheck {
    /// Creates a check matching `child_columns` to `parent_columns` positionally.
    pub fn new<C, P, S, T>(child_columns: C, parent_columns: P) -> Self
    where
        C: IntoIterator<Item = S>,
        P: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            child_columns: owned_columns(child_columns),
            parent_columns: owned_columns(parent_columns),
        }
    }

    /// Returns the foreign key columns of the child table.
    pub fn child_columns(&self) -> &[String] {
        &self.child_columns
    }

    /// Returns the referenced key columns of the parent table.
    pub fn parent_columns(&self) -> &[String] {
        &self.parent_columns
    }

    /// Runs the check with `child` referencing `parent`.
    #[instrument(
        skip(self, child, parent),
        fields(check = "referential_integrity", child = %child.name(), parent = %parent.name())
    )]
    pub fn check(&self, child: &Table, parent: &Table) -> Result<DiscrepancyReport, SchemaError> {
        validate_key_pair(
            CheckKind::ReferentialIntegrity.as_str(),
            &self.child_columns,
            &self.parent_columns,
        )?;
        let child_key = child.resolve_columns(&self.child_columns)?;
        let parent_key = parent.resolve_columns(&self.parent_columns)?;

        let parent_keys: HashSet<KeyTuple> = (0..parent.num_rows())
            .map(|index| parent.key_at(index, &parent_key))
            .filter(|key| !key.has_null())
            .collect();

        let mut skipped = 0usize;
        let mut violations = Vec::new();
        for index in 0..child.num_rows() {
            let key = child.key_at(index, &child_key);
            if key.has_null() {
                skipped += 1;
                continue;
            }
            if !parent_keys.contains(&key) {
                violations.push(Violation::OrphanReference {
                    row: child.row_ref(index),
                    columns: self.child_columns.clone(),
                    key,
                });
            }
        }

        debug!(
            parent_keys = parent_keys.len(),
            child_rows = child.num_rows(),
            null_keys = skipped,
            orphans = violations.len(),
            "Referential integrity scan finished"
        );

        let subject = format!("{} -> {}", child.name(), parent.name());
        let report = DiscrepancyReport::new(CheckKind::ReferentialIntegrity, subject, violations);
        report.log_outcome();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{DataType, Value};

    fn parent() -> Table {
        Table::builder("customers")
            .column("customer_id", DataType::Int64)
            .column("country", DataType::Utf8)
            .row(vec![Value::from(1i64), Value::from("Colombia")])
            .row(vec![Value::from(2i64), Value::from("Mexico")])
            .row(vec![Value::from(2i64), Value::from("Mexico")])
            .row(vec![Value::Null, Value::from("Chile")])
            .build()
            .unwrap()
    }

    fn child() -> Table {
        Table::builder("transactions")
            .column("transaction_id", DataType::Int64)
            .column("customer_id", DataType::Int64)
            .natural_key(["transaction_id"])
            .row(vec![Value::from(100i64), Value::from(1i64)])
            .row(vec![Value::from(101i64), Value::from(2i64)])
            .row(vec![Value::from(102i64), Value::Null])
            .row(vec![Value::from(103i64), Value::from(6i64)])
            .row(vec![Value::from(104i64), Value::from(7i64)])
            .build()
            .unwrap()
    }

    #[test]
    fn test_orphans_in_row_order() {
        let report = ReferentialIntegrityCheck::new(["customer_id"], ["customer_id"])
            .check(&child(), &parent())
            .unwrap();

        assert_eq!(report.subject(), "transactions -> customers");
        let orphans: Vec<_> = report
            .violations()
            .iter()
            .map(|v| match v {
                Violation::OrphanReference { row, key, .. } => {
                    (row.key.clone().unwrap(), key.clone())
                }
                other => panic!("unexpected violation {other:?}"),
            })
            .collect();
        assert_eq!(
            orphans,
            vec![
                (KeyTuple::new([103i64]), KeyTuple::new([6i64])),
                (KeyTuple::new([104i64]), KeyTuple::new([7i64])),
            ]
        );
    }

    #[test]
    fn test_composite_keys_match_positionally() {
        let child = Table::builder("orders")
            .column("country", DataType::Utf8)
            .column("id", DataType::Int64)
            .row(vec![Value::from("Mexico"), Value::from(2i64)])
            .row(vec![Value::from("Chile"), Value::from(2i64)])
            .build()
            .unwrap();
        let report = ReferentialIntegrityCheck::new(["id", "country"], ["customer_id", "country"])
            .check(&child, &parent())
            .unwrap();
        assert_eq!(report.len(), 1);
        assert!(matches!(
            &report.violations()[0],
            Violation::OrphanReference { row, .. } if row.index == 1
        ));
    }

    #[test]
    fn test_empty_parent_flags_every_non_null_child() {
        let empty = Table::builder("customers")
            .column("customer_id", DataType::Int64)
            .build()
            .unwrap();
        let report = ReferentialIntegrityCheck::new(["customer_id"], ["customer_id"])
            .check(&child(), &empty)
            .unwrap();
        assert_eq!(report.len(), 4);
    }

    #[test]
    fn test_configuration_errors() {
        let check = ReferentialIntegrityCheck::new(["customer_id", "transaction_id"], ["customer_id"]);
        assert!(matches!(
            check.check(&child(), &parent()),
            Err(SchemaError::KeyArityMismatch { .. })
        ));

        let none: [&str; 0] = [];
        assert!(matches!(
            ReferentialIntegrityCheck::new(none, none).check(&child(), &parent()),
            Err(SchemaError::EmptyKey { .. })
        ));

        let err = ReferentialIntegrityCheck::new(["customer_id"], ["id"])
            .check(&child(), &parent())
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::ColumnNotFound {
                table: "customers".to_string(),
                column: "id".to_string(),
            }
        );
    }
}
