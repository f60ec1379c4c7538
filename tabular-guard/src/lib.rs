//! # tabular-guard
//!
//! Data-quality and cross-source consistency checks for in-memory tables.
//!
//! A pipeline usually moves a source-of-record dataset (customers), a raw
//! transactional dataset referencing it and a cleaned copy of the
//! transactions. tabular-guard checks each of them and checks that they still
//! agree, and every check answers with a [`DiscrepancyReport`] naming each
//! offending row or group instead of a bare pass/fail.
//!
//! ## Checks
//!
//! - [`CompletenessCheck`](checks::CompletenessCheck): nulls in required columns
//! - [`UniquenessCheck`](checks::UniquenessCheck): duplicate non-null keys
//! - [`ReferentialIntegrityCheck`](checks::ReferentialIntegrityCheck): orphaned child rows
//! - [`ReconciliationCheck`](checks::ReconciliationCheck): per-group totals that
//!   differ between two tables, optionally resolving the group through a lookup table
//!
//! Configuration mistakes (an unknown column, key lists of different length)
//! are returned as [`SchemaError`](error::SchemaError) before any row is read.
//! Data problems are never errors.
//!
//! ## Quick Start
//!
//! ```rust
//! use tabular_guard::prelude::*;
//!
//! let customers = Table::builder("customers")
//!     .column("customer_id", DataType::Int64)
//!     .column("email", DataType::Utf8)
//!     .natural_key(["customer_id"])
//!     .row(vec![Value::from(1i64), Value::from("ana@email.com")])
//!     .row(vec![Value::from(2i64), Value::Null])
//!     .build()?;
//! let transactions = Table::builder("transactions")
//!     .column("transaction_id", DataType::Int64)
//!     .column("customer_id", DataType::Int64)
//!     .natural_key(["transaction_id"])
//!     .row(vec![Value::from(100i64), Value::from(1i64)])
//!     .row(vec![Value::from(104i64), Value::from(6i64)])
//!     .build()?;
//!
//! let missing = CompletenessCheck::new(["email"]).check(&customers)?;
//! assert_eq!(missing.len(), 1);
//!
//! let orphans = ReferentialIntegrityCheck::new(["customer_id"], ["customer_id"])
//!     .check(&transactions, &customers)?;
//! for violation in &orphans {
//!     println!("{violation}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`table`**: the immutable table model, plus conversion from Arrow record
//!   batches and JSON records
//! - **`checks`**: the four checks
//! - **`report`**: reports and violations
//! - **`core`**: declarative suites run against a catalog of named tables
//! - **`sources`**: async loading of tables registered with DataFusion
//! - **`formatters`**: text and JSON rendering
//! - **`logging`**: `tracing-subscriber` setup

pub mod checks;
pub mod core;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod report;
pub mod sources;
pub mod table;

pub use report::DiscrepancyReport;
