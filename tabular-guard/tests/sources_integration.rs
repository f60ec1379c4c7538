//! Loading tables through Arrow and DataFusion.

mod common;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType as ArrowType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use datafusion::prelude::SessionContext;
use std::sync::Arc;
use tabular_guard::prelude::*;
use tabular_guard::sources::{SessionLoader, TableLoader};

fn customers_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("customer_id", ArrowType::Int64, false),
        Field::new("name", ArrowType::Utf8, true),
        Field::new("email", ArrowType::Utf8, true),
        Field::new("country", ArrowType::Utf8, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![1, 2, 3, 4, 5])),
        Arc::new(StringArray::from(vec![
            Some("Ana Torres"),
            Some("Juan Pérez"),
            Some("Laura Gómez"),
            Some("Juan Pérez"),
            None,
        ])),
        Arc::new(StringArray::from(vec![
            Some("ana@email.com"),
            None,
            Some("laura_gomez@email.com"),
            Some("juanperez@email.com"),
            Some("andres@email.com"),
        ])),
        Arc::new(StringArray::from(vec![
            Some("Colombia"),
            Some("Mexico"),
            None,
            Some("Mexico"),
            Some("Chile"),
        ])),
    ];
    RecordBatch::try_new(schema, columns).unwrap()
}

fn transactions_batch() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("transaction_id", ArrowType::Int64, false),
        Field::new("customer_id", ArrowType::Int64, false),
        Field::new("amount", ArrowType::Float64, true),
        Field::new(
            "date",
            ArrowType::Timestamp(TimeUnit::Millisecond, None),
            false,
        ),
    ]));
    let day_ms = 86_400_000i64;
    let jan_1 = 1_735_689_600_000i64;
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![100, 101, 102, 103, 104])),
        Arc::new(Int64Array::from(vec![1, 2, 2, 3, 6])),
        Arc::new(Float64Array::from(vec![200.0, 150.0, 150.0, f64::NAN, 300.0])),
        Arc::new(TimestampMillisecondArray::from(vec![
            jan_1,
            jan_1 + day_ms,
            jan_1 + day_ms,
            jan_1 + 2 * day_ms,
            jan_1 + 3 * day_ms,
        ])),
    ];
    RecordBatch::try_new(schema, columns).unwrap()
}

fn session() -> SessionContext {
    let ctx = SessionContext::new();
    ctx.register_batch("customers", customers_batch()).unwrap();
    ctx.register_batch("transactions", transactions_batch()).unwrap();
    ctx
}

#[test]
fn record_batches_convert_to_the_fixture_tables() {
    let customers = Table::from_record_batch("customers", &customers_batch()).unwrap();
    assert_eq!(customers.num_rows(), 5);
    assert_eq!(
        customers.rows().collect::<Vec<_>>(),
        common::customers().rows().collect::<Vec<_>>()
    );

    let transactions = Table::from_record_batch("transactions", &transactions_batch()).unwrap();
    assert!(transactions.value(3, "amount").unwrap().is_null());
    assert_eq!(
        transactions.rows().collect::<Vec<_>>(),
        common::transactions().rows().collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn session_loader_applies_natural_keys() {
    let loader = SessionLoader::new(session()).with_natural_key("transactions", ["transaction_id"]);
    let transactions = loader.load_table("transactions").await.unwrap();

    assert_eq!(transactions.natural_key(), vec!["transaction_id"]);
    assert_eq!(transactions.columns()[3].data_type(), DataType::Timestamp);

    let report = CompletenessCheck::new(["amount"]).check(&transactions).unwrap();
    assert_eq!(
        report.violations(),
        &[Violation::MissingValue {
            row: RowRef::with_key(3, KeyTuple::new([103i64])),
            column: "amount".to_string(),
        }]
    );
}

#[tokio::test]
async fn catalog_loads_tables_for_a_suite() {
    let loader = SessionLoader::new(session())
        .with_natural_key("customers", ["customer_id"])
        .with_natural_key("transactions", ["transaction_id"]);
    let catalog = Catalog::load(&loader, &["customers", "transactions"])
        .await
        .unwrap();
    assert_eq!(catalog.len(), 2);

    let suite = ValidationSuite::builder("loaded")
        .check(
            SuiteCheck::new(
                "fk",
                Rule::referential_integrity("transactions", ["customer_id"], "customers", ["customer_id"]),
            )
            .level(Level::Error),
        )
        .build();
    let result = suite.run(&catalog).unwrap();
    assert!(!result.is_success());
    assert_eq!(result.metrics.total_violations, 1);
}

#[tokio::test]
async fn unknown_table_is_reported_by_name() {
    let loader = SessionLoader::new(session());
    match loader.load_table("payments").await {
        Err(GuardError::TableNotFound(name)) => assert_eq!(name, "payments"),
        other => panic!("expected TableNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn sql_views_can_be_loaded() {
    let ctx = session();
    let df = ctx
        .sql("SELECT customer_id, SUM(amount) AS amount FROM transactions GROUP BY customer_id")
        .await
        .unwrap();
    ctx.register_table("totals", df.into_view()).unwrap();

    let totals = SessionLoader::new(ctx).load_table("totals").await.unwrap();
    assert_eq!(totals.num_rows(), 4);
    assert_eq!(totals.columns()[1].data_type(), DataType::Float64);
}
