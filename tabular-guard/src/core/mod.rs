//! Suite orchestration: severities, table catalogs, suites and their results.

mod catalog;
mod level;
mod result;
mod suite;

pub use catalog::Catalog;
pub use level::Level;
pub use result::{CheckOutcome, SuiteMetrics, SuiteResult};
pub use suite::{LookupSpec, Rule, SideSpec, SuiteCheck, ValidationSuite, ValidationSuiteBuilder};
