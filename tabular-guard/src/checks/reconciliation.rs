//! Cross-table reconciliation of per-group totals.
//!
//! Each side of a reconciliation is aggregated on its own: rows with a null
//! measure or a null group value are dropped, and the measure is summed per
//! distinct group value. When the group attribute lives in another table (the
//! raw transactions only carry a customer id, the country is on the customer),
//! the side is given a [`Lookup`] that inner-joins each row to a dimension
//! table to resolve it.
//!
//! The group keys of both sides are then unioned, a group missing on one side
//! totalling `0.0` there, and any group whose totals differ by more than the
//! tolerance is reported.

use super::validate_key_pair;
use crate::error::SchemaError;
use crate::report::{CheckKind, DiscrepancyReport, Violation};
use crate::table::{KeyTuple, Table, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// A dimension table joined to one side of a reconciliation.
///
/// `local_columns` of the side's table are matched positionally to
/// `dimension_columns` of the dimension. Every matching dimension row
/// contributes, so a key present twice in the dimension counts the row twice.
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    dimension: &'a Table,
    local_columns: &'a [String],
    dimension_columns: &'a [String],
}

impl<'a> Lookup<'a> {
    /// Creates a lookup into `dimension`.
    pub fn new(
        dimension: &'a Table,
        local_columns: &'a [String],
        dimension_columns: &'a [String],
    ) -> Self {
        Self {
            dimension,
            local_columns,
            dimension_columns,
        }
    }

    /// Returns the dimension table.
    pub fn dimension(&self) -> &'a Table {
        self.dimension
    }
}

/// One side of a reconciliation: a table, optionally resolved through a lookup.
#[derive(Debug, Clone, Copy)]
pub struct AggregateSide<'a> {
    table: &'a Table,
    lookup: Option<Lookup<'a>>,
}

impl<'a> AggregateSide<'a> {
    /// A side whose group column is one of its own columns.
    pub fn native(table: &'a Table) -> Self {
        Self {
            table,
            lookup: None,
        }
    }

    /// A side whose group column is read from the dimension of `lookup`.
    pub fn with_lookup(table: &'a Table, lookup: Lookup<'a>) -> Self {
        Self {
            table,
            lookup: Some(lookup),
        }
    }

    /// Returns the table holding the measure.
    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// Returns the lookup, if any.
    pub fn lookup(&self) -> Option<&Lookup<'a>> {
        self.lookup.as_ref()
    }
}

/// Compares `sum(measure)` per `group_by` value between a source and a target.
///
/// # Examples
///
/// ```rust
/// use tabular_guard::checks::{AggregateSide, ReconciliationCheck};
/// use tabular_guard::table::{DataType, Table, Value};
///
/// let source = Table::builder("source")
///     .column("country", DataType::Utf8)
///     .column("amount", DataType::Float64)
///     .row(vec![Value::from("Mexico"), Value::from(150.0)])
///     .row(vec![Value::from("Mexico"), Value::from(150.0)])
///     .build()?;
/// let target = Table::builder("target")
///     .column("country", DataType::Utf8)
///     .column("amount", DataType::Float64)
///     .row(vec![Value::from("Mexico"), Value::from(299.5)])
///     .build()?;
///
/// let check = ReconciliationCheck::new("country", "amount");
/// let strict = check.check(AggregateSide::native(&source), AggregateSide::native(&target))?;
/// assert_eq!(strict.len(), 1);
///
/// let lenient = check
///     .tolerance(1.0)
///     .check(AggregateSide::native(&source), AggregateSide::native(&target))?;
/// assert!(lenient.is_clean());
/// # Ok::<(), tabular_guard::error::SchemaError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationCheck {
    group_by: String,
    measure: String,
    #[serde(default)]
    tolerance: f64,
}

impl ReconciliationCheck {
    /// Creates a check summing `measure` per `group_by` value, with zero tolerance.
    pub fn new(group_by: impl Into<String>, measure: impl Into<String>) -> Self {
        Self {
            group_by: group_by.into(),
            measure: measure.into(),
            tolerance: 0.0,
        }
    }

    /// Sets the largest absolute difference that is not reported.
    ///
    /// The value is validated when the check runs: a negative or non-finite
    /// tolerance is a [`SchemaError::InvalidTolerance`].
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Returns the grouping column.
    pub fn group_by(&self) -> &str {
        &self.group_by
    }

    /// Returns the measure column.
    pub fn measure(&self) -> &str {
        &self.measure
    }

    /// Returns the configured tolerance.
    pub fn tolerance_value(&self) -> f64 {
        self.tolerance
    }

    /// Runs the reconciliation of `source` against `target`.
    #[instrument(
        skip(self, source, target),
        fields(
            check = "reconciliation",
            source = %source.table.name(),
            target = %target.table.name(),
            group_by = %self.group_by,
            measure = %self.measure
        )
    )]
    pub fn check(
        &self,
        source: AggregateSide<'_>,
        target: AggregateSide<'_>,
    ) -> Result<DiscrepancyReport, SchemaError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SchemaError::InvalidTolerance(self.tolerance));
        }
        let source_plan = self.plan(&source)?;
        let target_plan = self.plan(&target)?;

        let source_totals = source_plan.aggregate();
        let target_totals = target_plan.aggregate();

        let mut violations = Vec::new();
        let mut compared = 0usize;
        for (group, source_total) in &source_totals.groups {
            compared += 1;
            let target_total = target_totals.get(group).unwrap_or(0.0);
            self.compare(group, *source_total, target_total, &mut violations);
        }
        for (group, target_total) in &target_totals.groups {
            if source_totals.get(group).is_none() {
                compared += 1;
                self.compare(group, 0.0, *target_total, &mut violations);
            }
        }

        debug!(
            groups = compared,
            mismatches = violations.len(),
            tolerance = self.tolerance,
            "Reconciliation finished"
        );

        let subject = format!("{} vs {}", source.table.name(), target.table.name());
        let report = DiscrepancyReport::new(CheckKind::Reconciliation, subject, violations);
        report.log_outcome();
        Ok(report)
    }

    fn compare(
        &self,
        group: &Value,
        source_total: f64,
        target_total: f64,
        violations: &mut Vec<Violation>,
    ) {
        let difference = source_total - target_total;
        // A NaN difference (opposite infinities) never counts as agreement.
        if difference.is_nan() || difference.abs() > self.tolerance {
            violations.push(Violation::AmountMismatch {
                group_column: self.group_by.clone(),
                group: group.clone(),
                measure_column: self.measure.clone(),
                source_total,
                target_total,
                difference,
            });
        }
    }

    /// Resolves every column a side needs before any row is read.
    fn plan<'a>(&self, side: &AggregateSide<'a>) -> Result<SidePlan<'a>, SchemaError> {
        let table = side.table;
        let measure = table.resolve_column(&self.measure)?;
        let measure_type = table.columns()[measure].data_type();
        if !measure_type.is_numeric() {
            return Err(SchemaError::NonNumericMeasure {
                table: table.name().to_string(),
                column: self.measure.clone(),
                found: measure_type,
            });
        }

        let grouping = match side.lookup {
            None => Grouping::Native {
                group: table.resolve_column(&self.group_by)?,
            },
            Some(lookup) => {
                validate_key_pair(
                    "lookup",
                    lookup.local_columns,
                    lookup.dimension_columns,
                )?;
                let local = table.resolve_columns(lookup.local_columns)?;
                let dimension_key = lookup.dimension.resolve_columns(lookup.dimension_columns)?;
                let group = lookup.dimension.resolve_column(&self.group_by)?;
                Grouping::Lookup {
                    dimension: lookup.dimension,
                    local,
                    dimension_key,
                    group,
                }
            }
        };

        Ok(SidePlan {
            table,
            measure,
            grouping,
        })
    }
}

enum Grouping<'a> {
    Native {
        group: usize,
    },
    Lookup {
        dimension: &'a Table,
        local: Vec<usize>,
        dimension_key: Vec<usize>,
        group: usize,
    },
}

struct SidePlan<'a> {
    table: &'a Table,
    measure: usize,
    grouping: Grouping<'a>,
}

impl SidePlan<'_> {
    fn aggregate(&self) -> Totals {
        let mut totals = Totals::default();
        let mut dropped = 0usize;

        match &self.grouping {
            Grouping::Native { group } => {
                for row in self.table.rows() {
                    match (row[self.measure].as_f64(), &row[*group]) {
                        (Some(amount), group) if !group.is_null() => {
                            totals.add(group, amount);
                        }
                        _ => dropped += 1,
                    }
                }
            }
            Grouping::Lookup {
                dimension,
                local,
                dimension_key,
                group,
            } => {
                let mut matches: HashMap<KeyTuple, Vec<usize>> = HashMap::new();
                for index in 0..dimension.num_rows() {
                    let key = dimension.key_at(index, dimension_key);
                    if !key.has_null() {
                        matches.entry(key).or_default().push(index);
                    }
                }

                for (index, row) in self.table.rows().enumerate() {
                    let Some(amount) = row[self.measure].as_f64() else {
                        dropped += 1;
                        continue;
                    };
                    let key = self.table.key_at(index, local);
                    let Some(dimension_rows) = matches.get(&key) else {
                        dropped += 1;
                        continue;
                    };
                    for &dim_row in dimension_rows {
                        let value = dimension.cell(dim_row, *group);
                        if value.is_null() {
                            dropped += 1;
                        } else {
                            totals.add(value, amount);
                        }
                    }
                }
            }
        }

        debug!(
            table = %self.table.name(),
            groups = totals.groups.len(),
            dropped,
            "Aggregated side"
        );
        totals
    }
}

/// Per-group sums in first-appearance order.
#[derive(Default)]
struct Totals {
    groups: Vec<(Value, f64)>,
    positions: HashMap<Value, usize>,
}

impl Totals {
    fn add(&mut self, group: &Value, amount: f64) {
        match self.positions.get(group) {
            Some(&position) => self.groups[position].1 += amount,
            None => {
                self.positions.insert(group.clone(), self.groups.len());
                self.groups.push((group.clone(), amount));
            }
        }
    }

    fn get(&self, group: &Value) -> Option<f64> {
        self.positions
            .get(group)
            .map(|&position| self.groups[position].1)
    }
}
