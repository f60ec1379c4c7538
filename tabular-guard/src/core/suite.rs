//! Declarative validation suites.
//!
//! A [`ValidationSuite`] is a named list of checks that address tables by
//! name. It can be assembled in code with [`ValidationSuite::builder`] or
//! read from JSON:
//!
//! ```json
//! {
//!   "name": "customer_pipeline",
//!   "checks": [
//!     {
//!       "name": "customers_complete",
//!       "level": "error",
//!       "rule": { "type": "completeness", "table": "customers", "columns": ["name", "email"] }
//!     },
//!     {
//!       "name": "amount_by_country",
//!       "rule": {
//!         "type": "reconciliation",
//!         "group_by": "country",
//!         "measure": "amount",
//!         "source": {
//!           "table": "transactions",
//!           "lookup": {
//!             "dimension": "customers",
//!             "local_columns": ["customer_id"],
//!             "dimension_columns": ["customer_id"]
//!           }
//!         },
//!         "target": { "table": "transactions_clean" }
//!       }
//!     }
//!   ]
//! }
//! ```

use super::{Catalog, CheckOutcome, Level, SuiteMetrics, SuiteResult};
use crate::checks::{
    AggregateSide, CompletenessCheck, Lookup, ReconciliationCheck, ReferentialIntegrityCheck,
    UniquenessCheck,
};
use crate::error::Result;
use crate::report::DiscrepancyReport;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// What a suite check verifies, with its table references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Runs a [`CompletenessCheck`] on `table`.
    Completeness { table: String, columns: Vec<String> },

    /// Runs a [`UniquenessCheck`] on `table`.
    Uniqueness { table: String, columns: Vec<String> },

    /// Runs a [`ReferentialIntegrityCheck`] of `child` against `parent`.
    ReferentialIntegrity {
        child: String,
        child_columns: Vec<String>,
        parent: String,
        parent_columns: Vec<String>,
    },

    /// Runs a [`ReconciliationCheck`] of `source` against `target`.
    Reconciliation {
        group_by: String,
        measure: String,
        #[serde(default)]
        tolerance: f64,
        source: SideSpec,
        target: SideSpec,
    },
}

/// One side of a reconciliation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSpec {
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup: Option<LookupSpec>,
}

impl SideSpec {
    /// A side grouped by one of its own columns.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            lookup: None,
        }
    }

    /// Resolves the group column through a dimension table.
    pub fn with_lookup(mut self, lookup: LookupSpec) -> Self {
        self.lookup = Some(lookup);
        self
    }
}

/// A dimension table reference for a [`SideSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupSpec {
    pub dimension: String,
    pub local_columns: Vec<String>,
    pub dimension_columns: Vec<String>,
}

impl LookupSpec {
    pub fn new<L, D, S, T>(dimension: impl Into<String>, local_columns: L, dimension_columns: D) -> Self
    where
        L: IntoIterator<Item = S>,
        D: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            dimension: dimension.into(),
            local_columns: local_columns.into_iter().map(Into::into).collect(),
            dimension_columns: dimension_columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl Rule {
    /// A completeness rule.
    pub fn completeness<I, S>(table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::Completeness {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// A uniqueness rule.
    pub fn uniqueness<I, S>(table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::Uniqueness {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// A referential integrity rule.
    pub fn referential_integrity<C, P, S, T>(
        child: impl Into<String>,
        child_columns: C,
        parent: impl Into<String>,
        parent_columns: P,
    ) -> Self
    where
        C: IntoIterator<Item = S>,
        P: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Rule::ReferentialIntegrity {
            child: child.into(),
            child_columns: child_columns.into_iter().map(Into::into).collect(),
            parent: parent.into(),
            parent_columns: parent_columns.into_iter().map(Into::into).collect(),
        }
    }

    /// A reconciliation rule with zero tolerance.
    pub fn reconciliation(
        group_by: impl Into<String>,
        measure: impl Into<String>,
        source: SideSpec,
        target: SideSpec,
    ) -> Self {
        Rule::Reconciliation {
            group_by: group_by.into(),
            measure: measure.into(),
            tolerance: 0.0,
            source,
            target,
        }
    }

    /// Sets the tolerance of a reconciliation rule; other rules are returned unchanged.
    pub fn with_tolerance(self, value: f64) -> Self {
        match self {
            Rule::Reconciliation {
                group_by,
                measure,
                source,
                target,
                ..
            } => Rule::Reconciliation {
                group_by,
                measure,
                tolerance: value,
                source,
                target,
            },
            other => other,
        }
    }

    /// Looks the referenced tables up in `catalog` and runs the check.
    pub fn evaluate(&self, catalog: &Catalog) -> Result<DiscrepancyReport> {
        let report = match self {
            Rule::Completeness { table, columns } => {
                CompletenessCheck::new(columns.iter().cloned()).check(catalog.get(table)?)?
            }
            Rule::Uniqueness { table, columns } => {
                UniquenessCheck::new(columns.iter().cloned()).check(catalog.get(table)?)?
            }
            Rule::ReferentialIntegrity {
                child,
                child_columns,
                parent,
                parent_columns,
            } => ReferentialIntegrityCheck::new(child_columns.iter().cloned(), parent_columns.iter().cloned())
                .check(catalog.get(child)?, catalog.get(parent)?)?,
            Rule::Reconciliation {
                group_by,
                measure,
                tolerance,
                source,
                target,
            } => ReconciliationCheck::new(group_by.as_str(), measure.as_str())
                .tolerance(*tolerance)
                .check(side(catalog, source)?, side(catalog, target)?)?,
        };
        Ok(report)
    }
}

fn side<'a>(catalog: &'a Catalog, spec: &'a SideSpec) -> Result<AggregateSide<'a>> {
    let table = catalog.get(&spec.table)?;
    Ok(match &spec.lookup {
        None => AggregateSide::native(table),
        Some(lookup) => AggregateSide::with_lookup(
            table,
            Lookup::new(
                catalog.get(&lookup.dimension)?,
                &lookup.local_columns,
                &lookup.dimension_columns,
            ),
        ),
    })
}

/// A named rule with a severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteCheck {
    pub name: String,
    #[serde(default)]
    pub level: Level,
    pub rule: Rule,
}

impl SuiteCheck {
    /// Creates a check at the default [`Level::Warning`].
    pub fn new(name: impl Into<String>, rule: Rule) -> Self {
        Self {
            name: name.into(),
            level: Level::default(),
            rule,
        }
    }

    /// Sets the severity.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

/// A collection of named checks run in declaration order.
///
/// # Examples
///
/// ```rust
/// use tabular_guard::core::{Catalog, Level, Rule, SuiteCheck, ValidationSuite};
/// use tabular_guard::table::{DataType, Table, Value};
///
/// let customers = Table::builder("customers")
///     .column("email", DataType::Utf8)
///     .row(vec![Value::from("ana@email.com")])
///     .row(vec![Value::Null])
///     .build()?;
/// let catalog = Catalog::new().with_table(customers);
///
/// let suite = ValidationSuite::builder("customers")
///     .check(SuiteCheck::new("email_present", Rule::completeness("customers", ["email"])).level(Level::Error))
///     .build();
///
/// let result = suite.run(&catalog)?;
/// assert!(!result.is_success());
/// assert_eq!(result.metrics.total_violations, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSuite {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    checks: Vec<SuiteCheck>,
}

impl ValidationSuite {
    /// Creates a new builder for constructing a validation suite.
    pub fn builder(name: impl Into<String>) -> ValidationSuiteBuilder {
        ValidationSuiteBuilder::new(name)
    }

    /// Reads a suite from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the suite as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn checks(&self) -> &[SuiteCheck] {
        &self.checks
    }

    /// Runs every check against `catalog`.
    ///
    /// Data-quality findings never make this fail; they end up in the
    /// returned [`SuiteResult`]. A configuration error in any check (an
    /// unknown table or column, mismatched keys) aborts the run.
    #[instrument(skip(self, catalog), fields(
        suite.name = %self.name,
        suite.checks = self.checks.len()
    ))]
    pub fn run(&self, catalog: &Catalog) -> Result<SuiteResult> {
        info!(
            suite.name = %self.name,
            suite.checks = self.checks.len(),
            suite.description = ?self.description,
            "Starting validation suite"
        );
        let start_time = Instant::now();

        let mut outcomes = Vec::with_capacity(self.checks.len());
        let mut metrics = SuiteMetrics::default();

        for check in &self.checks {
            debug!(check.name = %check.name, check.level = %check.level, "Running check");
            let report = match check.rule.evaluate(catalog) {
                Ok(report) => report,
                Err(e) => {
                    warn!(check.name = %check.name, error = %e, "Check could not run");
                    return Err(e);
                }
            };

            metrics.total_checks += 1;
            metrics.total_violations += report.len();
            if report.is_clean() {
                metrics.clean_checks += 1;
            } else {
                metrics.failed_checks += 1;
            }

            outcomes.push(CheckOutcome {
                name: check.name.clone(),
                level: check.level,
                report,
            });
        }

        metrics.execution_time_ms = start_time.elapsed().as_millis() as u64;
        let result = SuiteResult {
            suite_name: self.name.clone(),
            outcomes,
            metrics,
        };

        info!(
            suite.name = %self.name,
            metrics.clean = result.metrics.clean_checks,
            metrics.failed = result.metrics.failed_checks,
            metrics.violations = result.metrics.total_violations,
            success = result.is_success(),
            "Validation suite completed"
        );
        Ok(result)
    }
}

/// Builder for [`ValidationSuite`].
#[derive(Debug)]
pub struct ValidationSuiteBuilder {
    name: String,
    description: Option<String>,
    checks: Vec<SuiteCheck>,
}

impl ValidationSuiteBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            checks: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a check.
    pub fn check(mut self, check: SuiteCheck) -> Self {
        self.checks.push(check);
        self
    }

    /// Appends several checks.
    pub fn checks<I>(mut self, checks: I) -> Self
    where
        I: IntoIterator<Item = SuiteCheck>,
    {
        self.checks.extend(checks);
        self
    }

    pub fn build(self) -> ValidationSuite {
        ValidationSuite {
            name: self.name,
            description: self.description,
            checks: self.checks,
        }
    }
}
