//! In-memory tabular data model.
//!
//! A [`Table`] is an ordered sequence of rows over named, typed, nullable
//! columns. Tables are assembled with a [`TableBuilder`] (directly, or from
//! Arrow record batches or JSON records) and are read-only afterwards. Checks
//! borrow tables and never mutate them.
//!
//! # Examples
//!
//! ```rust
//! use tabular_guard::table::{DataType, Table, Value};
//!
//! let customers = Table::builder("customers")
//!     .column("customer_id", DataType::Int64)
//!     .column("email", DataType::Utf8)
//!     .natural_key(["customer_id"])
//!     .row(vec![Value::from(1i64), Value::from("ana@email.com")])
//!     .row(vec![Value::from(2i64), Value::Null])
//!     .build()?;
//!
//! assert_eq!(customers.num_rows(), 2);
//! assert!(customers.value(1, "email").unwrap().is_null());
//! # Ok::<(), tabular_guard::error::SchemaError>(())
//! ```

mod batch;
mod json;
mod value;

pub use value::{KeyTuple, Value};

use crate::error::SchemaError;
use crate::report::RowRef;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// UTF-8 text
    Utf8,
    /// 64-bit signed integer
    Int64,
    /// 64-bit float
    Float64,
    /// Instant in UTC
    Timestamp,
}

impl DataType {
    /// Returns the string representation of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Utf8 => "utf8",
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::Timestamp => "timestamp",
        }
    }

    /// Returns true for types that can be summed.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int64 | DataType::Float64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named, typed column. Every column is nullable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    data_type: DataType,
}

impl Column {
    /// Creates a new column.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the column type.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

/// An immutable in-memory table.
///
/// Invariants established by [`TableBuilder::build`]:
/// - column names are unique and their order is stable;
/// - every row holds exactly one value per column;
/// - every non-null value matches its column type and no float is NaN;
/// - row order is insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
    natural_key: Vec<usize>,
}

impl Table {
    /// Starts building a table with the given name.
    pub fn builder(name: impl Into<String>) -> TableBuilder {
        TableBuilder::new(name)
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in schema order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column names in schema order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(Column::name)
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the position of a column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns the position of a column or a [`SchemaError::ColumnNotFound`].
    pub fn resolve_column(&self, name: &str) -> Result<usize, SchemaError> {
        self.column_index(name)
            .ok_or_else(|| SchemaError::ColumnNotFound {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// Resolves every name, failing on the first unknown column.
    pub fn resolve_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>, SchemaError> {
        names
            .iter()
            .map(|name| self.resolve_column(name.as_ref()))
            .collect()
    }

    /// Returns the row at `index`.
    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Iterates over rows in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Returns the value of `column` in row `index`.
    pub fn value(&self, index: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(index).map(|row| &row[col])
    }

    /// Returns the natural key column names (empty when rows are identified by index only).
    pub fn natural_key(&self) -> Vec<&str> {
        self.natural_key
            .iter()
            .map(|&col| self.columns[col].name.as_str())
            .collect()
    }

    /// Returns the identity of a row: its index plus the natural key, if defined.
    pub fn row_ref(&self, index: usize) -> RowRef {
        if self.natural_key.is_empty() {
            RowRef::at(index)
        } else {
            RowRef::with_key(index, self.key_at(index, &self.natural_key))
        }
    }

    /// Returns the value at a resolved column position.
    ///
    /// Same preconditions as [`Table::key_at`].
    pub(crate) fn cell(&self, index: usize, column: usize) -> &Value {
        &self.rows[index][column]
    }

    /// Extracts the key tuple of `columns` (positions) from row `index`.
    ///
    /// Callers must pass an in-range row and column positions obtained from
    /// [`Table::resolve_columns`].
    pub(crate) fn key_at(&self, index: usize, columns: &[usize]) -> KeyTuple {
        let row = &self.rows[index];
        KeyTuple::from(columns.iter().map(|&col| row[col].clone()).collect::<Vec<_>>())
    }
}

/// Builder for [`Table`].
///
/// Columns and rows are collected as given; all schema validation happens in
/// [`TableBuilder::build`].
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
    natural_key: Vec<String>,
}

impl TableBuilder {
    /// Creates a builder for a table with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            natural_key: Vec::new(),
        }
    }

    /// Appends a column to the schema.
    pub fn column(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.columns.push(Column::new(name, data_type));
        self
    }

    /// Appends several columns to the schema.
    pub fn columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = Column>,
    {
        self.columns.extend(columns);
        self
    }

    /// Declares the columns that identify a row in reports.
    pub fn natural_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.natural_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a row; values are matched to columns positionally.
    pub fn row<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rows
            .push(values.into_iter().map(|v| v.into().normalized()).collect());
        self
    }

    /// Appends several rows.
    pub fn rows<I>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        self.rows.extend(
            rows.into_iter()
                .map(|row| row.into_iter().map(Value::normalized).collect()),
        );
        self
    }

    /// Returns the columns declared so far.
    pub fn schema(&self) -> &[Column] {
        &self.columns
    }

    /// Validates the schema and every row, producing the table.
    pub fn build(self) -> Result<Table, SchemaError> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        for (index, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(SchemaError::RowArity {
                    table: self.name.clone(),
                    row: index,
                    expected: self.columns.len(),
                    found: row.len(),
                });
            }
            for (column, value) in self.columns.iter().zip(row) {
                if let Some(found) = value.data_type() {
                    if found != column.data_type {
                        return Err(SchemaError::TypeMismatch {
                            table: self.name.clone(),
                            column: column.name.clone(),
                            row: index,
                            expected: column.data_type,
                            found,
                        });
                    }
                }
            }
        }

        let mut table = Table {
            name: self.name,
            columns: self.columns,
            rows: self.rows,
            natural_key: Vec::new(),
        };
        table.natural_key = table.resolve_columns(&self.natural_key)?;
        Ok(table)
    }
}
