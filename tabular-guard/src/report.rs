//! Discrepancy reports returned by every check.
//!
//! A [`DiscrepancyReport`] is an immutable value: it names the check that
//! produced it and the table(s) it ran against, and lists every
//! [`Violation`] found, in a deterministic order. `is_clean` is true iff the
//! list is empty.

use crate::table::{KeyTuple, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// The kind of check that produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Completeness,
    Uniqueness,
    ReferentialIntegrity,
    Reconciliation,
}

impl CheckKind {
    /// Returns the string representation of the check kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Completeness => "completeness",
            CheckKind::Uniqueness => "uniqueness",
            CheckKind::ReferentialIntegrity => "referential_integrity",
            CheckKind::Reconciliation => "reconciliation",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind tag of a [`Violation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    MissingValue,
    DuplicateKey,
    OrphanReference,
    AmountMismatch,
}

impl ViolationKind {
    /// Returns the string representation of the violation kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::MissingValue => "missing_value",
            ViolationKind::DuplicateKey => "duplicate_key",
            ViolationKind::OrphanReference => "orphan_reference",
            ViolationKind::AmountMismatch => "amount_mismatch",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a row within its table.
///
/// `index` is the zero-based position in insertion order. `key` holds the
/// row's natural key when the table declares one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRef {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyTuple>,
}

impl RowRef {
    /// A row identified by position only.
    pub fn at(index: usize) -> Self {
        Self { index, key: None }
    }

    /// A row identified by position and natural key.
    pub fn with_key(index: usize, key: KeyTuple) -> Self {
        Self {
            index,
            key: Some(key),
        }
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "row {} (key {key})", self.index),
            None => write!(f, "row {}", self.index),
        }
    }
}

/// A single data-quality finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A required column holds a null.
    MissingValue { row: RowRef, column: String },

    /// Several rows share one non-null key tuple. One violation per group.
    DuplicateKey {
        columns: Vec<String>,
        key: KeyTuple,
        /// Every row sharing the key, in row order
        rows: Vec<RowRef>,
    },

    /// A child row whose foreign key matches no parent row.
    OrphanReference {
        row: RowRef,
        columns: Vec<String>,
        key: KeyTuple,
    },

    /// Totals of a group disagree beyond the tolerance.
    AmountMismatch {
        group_column: String,
        group: Value,
        measure_column: String,
        source_total: f64,
        target_total: f64,
        /// `source_total - target_total`
        difference: f64,
    },
}

impl Violation {
    /// Returns the kind tag.
    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::MissingValue { .. } => ViolationKind::MissingValue,
            Violation::DuplicateKey { .. } => ViolationKind::DuplicateKey,
            Violation::OrphanReference { .. } => ViolationKind::OrphanReference,
            Violation::AmountMismatch { .. } => ViolationKind::AmountMismatch,
        }
    }

    /// Returns the columns involved.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Violation::MissingValue { column, .. } => vec![column.as_str()],
            Violation::DuplicateKey { columns, .. } | Violation::OrphanReference { columns, .. } => {
                columns.iter().map(String::as_str).collect()
            }
            Violation::AmountMismatch {
                group_column,
                measure_column,
                ..
            } => vec![group_column.as_str(), measure_column.as_str()],
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingValue { row, column } => {
                write!(f, "{row}: '{column}' is null")
            }
            Violation::DuplicateKey { columns, key, rows } => {
                write!(
                    f,
                    "key {key} on [{}] appears in {} rows:",
                    columns.join(", "),
                    rows.len()
                )?;
                for row in rows {
                    write!(f, " {}", row.index)?;
                }
                Ok(())
            }
            Violation::OrphanReference { row, columns, key } => {
                write!(
                    f,
                    "{row}: [{}] = {key} has no matching parent row",
                    columns.join(", ")
                )
            }
            Violation::AmountMismatch {
                group_column,
                group,
                measure_column,
                source_total,
                target_total,
                difference,
            } => write!(
                f,
                "{group_column} = {group}: sum({measure_column}) source {source_total} vs target {target_total} (difference {difference})"
            ),
        }
    }
}

/// The result of one check invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscrepancyReport {
    check: CheckKind,
    subject: String,
    is_clean: bool,
    violations: Vec<Violation>,
}

impl DiscrepancyReport {
    /// Creates a report; `is_clean` is derived from `violations`.
    pub fn new(check: CheckKind, subject: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self {
            check,
            subject: subject.into(),
            is_clean: violations.is_empty(),
            violations,
        }
    }

    /// Returns the kind of check that produced this report.
    pub fn check(&self) -> CheckKind {
        self.check
    }

    /// Returns the table name(s) the check ran against.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns true iff no violations were found.
    pub fn is_clean(&self) -> bool {
        self.is_clean
    }

    /// Returns the violations in report order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Counts violations of one kind.
    pub fn count_of(&self, kind: ViolationKind) -> usize {
        self.violations.iter().filter(|v| v.kind() == kind).count()
    }

    /// Consumes the report, returning its violations.
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub(crate) fn log_outcome(&self) {
        if self.is_clean {
            debug!(check = %self.check, subject = %self.subject, "Check passed");
        } else {
            warn!(
                check = %self.check,
                subject = %self.subject,
                violations = self.violations.len(),
                "Check found discrepancies"
            );
        }
    }
}

impl<'a> IntoIterator for &'a DiscrepancyReport {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mismatch() -> Violation {
        Violation::AmountMismatch {
            group_column: "country".to_string(),
            group: Value::from("Mexico"),
            measure_column: "amount".to_string(),
            source_total: 300.0,
            target_total: 290.0,
            difference: 10.0,
        }
    }

    #[test]
    fn test_is_clean_follows_violations() {
        let clean = DiscrepancyReport::new(CheckKind::Completeness, "customers", vec![]);
        assert!(clean.is_clean());
        assert!(clean.is_empty());

        let dirty = DiscrepancyReport::new(CheckKind::Reconciliation, "a vs b", vec![mismatch()]);
        assert!(!dirty.is_clean());
        assert_eq!(dirty.count_of(ViolationKind::AmountMismatch), 1);
        assert_eq!(dirty.count_of(ViolationKind::MissingValue), 0);
    }

    #[test]
    fn test_violation_serialization_is_tagged() {
        let violation = Violation::MissingValue {
            row: RowRef::with_key(4, KeyTuple::new([5i64])),
            column: "name".to_string(),
        };
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["kind"], "missing_value");
        assert_eq!(json["row"]["index"], 4);
        assert_eq!(json["row"]["key"][0]["type"], "int");
        assert_eq!(json["row"]["key"][0]["value"], 5);
        assert_eq!(json["column"], "name");

        let unkeyed = serde_json::to_value(&Violation::MissingValue {
            row: RowRef::at(1),
            column: "email".to_string(),
        })
        .unwrap();
        assert!(unkeyed["row"].get("key").is_none());
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let report = DiscrepancyReport::new(CheckKind::Reconciliation, "a vs b", vec![mismatch()]);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""check":"reconciliation""#));
        assert!(json.contains(r#""is_clean":false"#));

        let back: DiscrepancyReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_date_like_keys_round_trip() {
        let day = "2025-01-01T00:00:00Z";
        let report = DiscrepancyReport::new(
            CheckKind::Reconciliation,
            "daily vs ledger",
            vec![
                Violation::AmountMismatch {
                    group_column: "day".to_string(),
                    group: Value::from(day),
                    measure_column: "amount".to_string(),
                    source_total: 10.0,
                    target_total: 0.0,
                    difference: 10.0,
                },
                Violation::OrphanReference {
                    row: RowRef::with_key(0, KeyTuple::new([day])),
                    columns: vec!["day".to_string()],
                    key: KeyTuple::new([day]),
                },
            ],
        );

        let back: DiscrepancyReport =
            serde_json::from_str(&serde_json::to_string(&report).unwrap()).unwrap();
        assert_eq!(back, report);
        match &back.violations()[0] {
            Violation::AmountMismatch { group, .. } => assert_eq!(group.as_str(), Some(day)),
            other => panic!("unexpected violation {other:?}"),
        }
    }

    #[test]
    fn test_violation_display() {
        assert_eq!(
            mismatch().to_string(),
            "country = Mexico: sum(amount) source 300 vs target 290 (difference 10)"
        );

        let duplicate = Violation::DuplicateKey {
            columns: vec!["name".to_string()],
            key: KeyTuple::new(["Juan Pérez"]),
            rows: vec![RowRef::at(1), RowRef::at(3)],
        };
        assert_eq!(
            duplicate.to_string(),
            "key Juan Pérez on [name] appears in 2 rows: 1 3"
        );
        assert_eq!(duplicate.columns(), vec!["name"]);
    }
}
