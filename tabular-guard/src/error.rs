//! Error types for the tabular-guard validation library.
//!
//! Two error classes are kept apart:
//!
//! - [`SchemaError`] covers configuration mistakes made by the caller (a column
//!   that does not exist, join key lists of different lengths, a value of the
//!   wrong type while building a table). Checks return it before any row is
//!   scanned.
//! - [`GuardError`] is the crate-level error for everything around the engine:
//!   loading tables from Arrow, DataFusion or JSON, looking tables up in a
//!   catalog and formatting reports.
//!
//! Data-quality problems are never errors. They are reported as
//! [`Violation`](crate::report::Violation)s inside a
//! [`DiscrepancyReport`](crate::report::DiscrepancyReport).

use crate::table::DataType;
use thiserror::Error;

/// A configuration error detected while building a table or preparing a check.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A referenced column is not part of the table schema.
    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound {
        /// Table that was searched
        table: String,
        /// Column that was requested
        column: String,
    },

    /// Two columns of one table share a name.
    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// A row does not carry exactly one value per column.
    #[error("Row {row} of table '{table}' has {found} values, expected {expected}")]
    RowArity {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A non-null value does not match the declared column type.
    #[error("Type mismatch in '{table}.{column}' at row {row}: expected {expected}, found {found}")]
    TypeMismatch {
        table: String,
        column: String,
        row: usize,
        expected: DataType,
        found: DataType,
    },

    /// Join key lists have different lengths.
    #[error("Key arity mismatch: {left:?} has {} columns but {right:?} has {} columns", .left.len(), .right.len())]
    KeyArityMismatch {
        /// Key columns on the referencing side
        left: Vec<String>,
        /// Key columns on the referenced side
        right: Vec<String>,
    },

    /// A check that matches or groups on a key was given no key columns.
    #[error("{check} requires at least one key column")]
    EmptyKey { check: String },

    /// The measure of a reconciliation is not a numeric column.
    #[error("Measure column '{table}.{column}' must be numeric, found {found}")]
    NonNumericMeasure {
        table: String,
        column: String,
        found: DataType,
    },

    /// The reconciliation tolerance is negative, NaN or infinite.
    #[error("Tolerance must be a finite, non-negative number, got {0}")]
    InvalidTolerance(f64),
}

/// The crate-level error type.
#[derive(Error, Debug)]
pub enum GuardError {
    /// A configuration error raised by a table or a check.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A suite referenced a table that is not registered in the catalog.
    #[error("Table '{0}' not found in catalog")]
    TableNotFound(String),

    /// An Arrow column type that has no counterpart in the table model.
    #[error("Unsupported Arrow type {data_type} for column '{column}'")]
    UnsupportedType { column: String, data_type: String },

    /// A JSON record that cannot be turned into a row.
    #[error("Invalid record at index {index}: {message}")]
    InvalidRecord { index: usize, message: String },

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error while writing formatted output.
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// A type alias for `Result<T, GuardError>`.
///
/// # Examples
///
/// ```rust
/// use tabular_guard::error::Result;
///
/// fn load() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, GuardError>;

impl GuardError {
    /// Creates an invalid record error.
    pub fn invalid_record(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            index,
            message: message.into(),
        }
    }

    /// Returns the configuration error when this error wraps one.
    pub fn as_schema_error(&self) -> Option<&SchemaError> {
        match self {
            Self::Schema(err) => Some(err),
            _ => None,
        }
    }
}
