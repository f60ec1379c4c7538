//! Prelude for commonly used types and traits in tabular-guard.

pub use crate::checks::{
    AggregateSide, CompletenessCheck, Lookup, ReconciliationCheck, ReferentialIntegrityCheck,
    UniquenessCheck,
};
pub use crate::core::{Catalog, Level, Rule, SideSpec, SuiteCheck, SuiteResult, ValidationSuite};
pub use crate::error::{GuardError, Result, SchemaError};
pub use crate::formatters::{FormatterConfig, ReportFormatter};
pub use crate::report::{CheckKind, DiscrepancyReport, RowRef, Violation, ViolationKind};
pub use crate::table::{Column, DataType, KeyTuple, Table, TableBuilder, Value};
