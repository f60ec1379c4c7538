//! Data-quality checks.
//!
//! Every check is a small value type holding its configuration. Calling
//! `check` validates that configuration against the table schema(s) first,
//! returning a [`SchemaError`] before any row is read, and then scans the rows
//! to produce a [`DiscrepancyReport`](crate::report::DiscrepancyReport).
//!
//! Checks are pure functions of their inputs: they borrow the tables, hold no
//! mutable state and can be shared across threads.
//!
//! | Check | Finds |
//! |-------|-------|
//! | [`CompletenessCheck`] | nulls in required columns |
//! | [`UniquenessCheck`] | duplicate non-null key tuples |
//! | [`ReferentialIntegrityCheck`] | child rows without a parent |
//! | [`ReconciliationCheck`] | per-group totals that disagree between two tables |

mod completeness;
mod reconciliation;
mod referential;
mod uniqueness;

pub use completeness::CompletenessCheck;
pub use reconciliation::{AggregateSide, Lookup, ReconciliationCheck};
pub use referential::ReferentialIntegrityCheck;
pub use uniqueness::UniquenessCheck;

use crate::error::SchemaError;

/// Validates a pair of positionally matched key column lists.
pub(crate) fn validate_key_pair(
    check: &str,
    left: &[String],
    right: &[String],
) -> Result<(), SchemaError> {
    if left.is_empty() || right.is_empty() {
        return Err(SchemaError::EmptyKey {
            check: check.to_string(),
        });
    }
    if left.len() != right.len() {
        return Err(SchemaError::KeyArityMismatch {
            left: left.to_vec(),
            right: right.to_vec(),
        });
    }
    Ok(())
}

pub(crate) fn owned_columns<I, S>(columns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    columns.into_iter().map(Into::into).collect()
}
