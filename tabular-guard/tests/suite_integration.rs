//! Suites declared in JSON and run against the fixture catalog.

mod common;

use tabular_guard::core::{Level, ValidationSuite};
use tabular_guard::error::GuardError;
use tabular_guard::formatters::{FormatterConfig, HumanFormatter, JsonFormatter, ReportFormatter};
use tabular_guard::report::{CheckKind, ViolationKind};

const PIPELINE: &str = r#"{
  "name": "customer_pipeline",
  "description": "Checks run after every load",
  "checks": [
    {
      "name": "customers_complete",
      "level": "error",
      "rule": { "type": "completeness", "table": "customers", "columns": ["name", "email", "country"] }
    },
    {
      "name": "transaction_amounts",
      "level": "warning",
      "rule": { "type": "completeness", "table": "transactions", "columns": ["amount"] }
    },
    {
      "name": "unique_emails",
      "level": "error",
      "rule": { "type": "uniqueness", "table": "customers", "columns": ["email"] }
    },
    {
      "name": "transactions_have_customers",
      "level": "error",
      "rule": {
        "type": "referential_integrity",
        "child": "transactions",
        "child_columns": ["customer_id"],
        "parent": "customers",
        "parent_columns": ["customer_id"]
      }
    },
    {
      "name": "amount_by_country",
      "level": "info",
      "rule": {
        "type": "reconciliation",
        "group_by": "country",
        "measure": "amount",
        "source": {
          "table": "transactions",
          "lookup": {
            "dimension": "customers",
            "local_columns": ["customer_id"],
            "dimension_columns": ["customer_id"]
          }
        },
        "target": { "table": "transactions_clean" }
      }
    }
  ]
}"#;

#[test]
fn pipeline_suite_reports_every_finding() {
    let suite = ValidationSuite::from_json(PIPELINE).unwrap();
    assert_eq!(suite.checks().len(), 5);
    assert_eq!(suite.description(), Some("Checks run after every load"));

    let result = suite.run(&common::catalog()).unwrap();
    assert!(!result.is_success());
    assert_eq!(result.suite_name, "customer_pipeline");
    assert_eq!(result.metrics.total_checks, 5);
    assert_eq!(result.metrics.clean_checks, 1);
    assert_eq!(result.metrics.failed_checks, 4);
    // 3 missing customer fields, 1 missing amount, 1 orphan, 2 mismatched countries
    assert_eq!(result.metrics.total_violations, 7);

    let recon = result.outcome("amount_by_country").unwrap();
    assert_eq!(recon.level, Level::Info);
    assert_eq!(recon.report.check(), CheckKind::Reconciliation);
    assert_eq!(recon.report.count_of(ViolationKind::AmountMismatch), 2);

    let blocking: Vec<_> = result
        .failures_at_least(Level::Error)
        .into_iter()
        .map(|o| o.name.as_str())
        .collect();
    assert_eq!(blocking, vec!["customers_complete", "transactions_have_customers"]);
}

#[test]
fn suite_with_only_soft_failures_succeeds() {
    let suite = ValidationSuite::from_json(
        r#"{
          "name": "soft",
          "checks": [
            { "name": "amounts", "rule": { "type": "completeness", "table": "transactions", "columns": ["amount"] } },
            { "name": "ids", "level": "error", "rule": { "type": "uniqueness", "table": "transactions", "columns": ["transaction_id"] } }
          ]
        }"#,
    )
    .unwrap();

    let result = suite.run(&common::catalog()).unwrap();
    assert!(result.is_success());
    assert_eq!(result.outcomes[0].level, Level::Warning);
    assert!(result.outcomes[1].is_clean());
}

#[test]
fn reconciliation_tolerance_from_json() {
    let suite = ValidationSuite::from_json(
        r#"{
          "name": "lenient",
          "checks": [{
            "name": "amounts",
            "level": "error",
            "rule": {
              "type": "reconciliation",
              "group_by": "country",
              "measure": "amount",
              "tolerance": 50.0,
              "source": {
                "table": "transactions",
                "lookup": { "dimension": "customers", "local_columns": ["customer_id"], "dimension_columns": ["customer_id"] }
              },
              "target": { "table": "transactions_clean" }
            }
          }]
        }"#,
    )
    .unwrap();
    assert!(suite.run(&common::catalog()).unwrap().is_success());
}

#[test]
fn configuration_errors_abort_the_suite() {
    let unknown_table = ValidationSuite::from_json(
        r#"{"name": "s", "checks": [{"name": "c", "rule": {"type": "completeness", "table": "orders", "columns": ["id"]}}]}"#,
    )
    .unwrap();
    assert!(matches!(
        unknown_table.run(&common::catalog()),
        Err(GuardError::TableNotFound(_))
    ));

    let arity = ValidationSuite::from_json(
        r#"{"name": "s", "checks": [{"name": "c", "rule": {
            "type": "referential_integrity",
            "child": "transactions", "child_columns": ["customer_id", "transaction_id"],
            "parent": "customers", "parent_columns": ["customer_id"]
        }}]}"#,
    )
    .unwrap();
    let err = arity.run(&common::catalog()).unwrap_err();
    assert!(err.as_schema_error().is_some());
}

#[test]
fn suite_results_render_as_text_and_json() {
    let result = ValidationSuite::from_json(PIPELINE)
        .unwrap()
        .run(&common::catalog())
        .unwrap();

    let text = HumanFormatter::with_config(FormatterConfig::ci())
        .format_suite(&result)
        .unwrap();
    assert!(text.starts_with("Validation FAILED"));
    assert!(text.contains("[ERROR] transactions_have_customers"));
    assert!(text.contains("country = Argentina"));

    let json = JsonFormatter::new().format_suite(&result).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["outcomes"].as_array().unwrap().len(), 5);
    assert_eq!(
        value["outcomes"][3]["report"]["violations"][0]["kind"],
        "orphan_reference"
    );
    assert_eq!(result.to_json().unwrap(), json);
}
