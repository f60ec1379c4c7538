//! Shared fixture: the three datasets of the customer pipeline.
#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use tabular_guard::core::Catalog;
use tabular_guard::table::{DataType, Table, Value};

/// Source of record. Row 1 has no email, row 4 has no name, row 2 has no
/// country, and "Juan Pérez" appears twice with different emails.
pub fn customers() -> Table {
    Table::builder("customers")
        .column("customer_id", DataType::Int64)
        .column("name", DataType::Utf8)
        .column("email", DataType::Utf8)
        .column("country", DataType::Utf8)
        .natural_key(["customer_id"])
        .row(vec![
            Value::from(1i64),
            Value::from("Ana Torres"),
            Value::from("ana@email.com"),
            Value::from("Colombia"),
        ])
        .row(vec![
            Value::from(2i64),
            Value::from("Juan Pérez"),
            Value::Null,
            Value::from("Mexico"),
        ])
        .row(vec![
            Value::from(3i64),
            Value::from("Laura Gómez"),
            Value::from("laura_gomez@email.com"),
            Value::Null,
        ])
        .row(vec![
            Value::from(4i64),
            Value::from("Juan Pérez"),
            Value::from("juanperez@email.com"),
            Value::from("Mexico"),
        ])
        .row(vec![
            Value::from(5i64),
            Value::Null,
            Value::from("andres@email.com"),
            Value::from("Chile"),
        ])
        .build()
        .expect("customers fixture is valid")
}

/// Raw transactions. 103 has no amount, 104 references the unknown customer 6.
pub fn transactions() -> Table {
    let day = |d: u32| Value::from(Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap());
    Table::builder("transactions")
        .column("transaction_id", DataType::Int64)
        .column("customer_id", DataType::Int64)
        .column("amount", DataType::Float64)
        .column("date", DataType::Timestamp)
        .natural_key(["transaction_id"])
        .row(vec![Value::from(100i64), Value::from(1i64), Value::from(200.0), day(1)])
        .row(vec![Value::from(101i64), Value::from(2i64), Value::from(150.0), day(2)])
        .row(vec![Value::from(102i64), Value::from(2i64), Value::from(150.0), day(2)])
        .row(vec![Value::from(103i64), Value::from(3i64), Value::from(f64::NAN), day(3)])
        .row(vec![Value::from(104i64), Value::from(6i64), Value::from(300.0), day(4)])
        .build()
        .expect("transactions fixture is valid")
}

/// Downstream copy. 102 was cleaned to 140 and 105 is an invented Argentina row.
pub fn transactions_clean() -> Table {
    Table::builder("transactions_clean")
        .column("transaction_id", DataType::Int64)
        .column("amount", DataType::Float64)
        .column("country", DataType::Utf8)
        .natural_key(["transaction_id"])
        .row(vec![Value::from(100i64), Value::from(200.0), Value::from("Colombia")])
        .row(vec![Value::from(101i64), Value::from(150.0), Value::from("Mexico")])
        .row(vec![Value::from(102i64), Value::from(140.0), Value::from("Mexico")])
        .row(vec![Value::from(105i64), Value::from(50.0), Value::from("Argentina")])
        .build()
        .expect("transactions_clean fixture is valid")
}

pub fn catalog() -> Catalog {
    Catalog::new()
        .with_table(customers())
        .with_table(transactions())
        .with_table(transactions_clean())
}
