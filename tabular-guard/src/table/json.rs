//! Conversion from JSON records.

use super::{Column, DataType, TableBuilder, Value};
use crate::error::{GuardError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

impl TableBuilder {
    /// Creates a builder from JSON objects, one per row.
    ///
    /// The schema is declared by the caller; nothing is inferred. A missing
    /// key or a JSON `null` becomes [`Value::Null`]. Keys not declared in the
    /// schema are ignored. Strings in a `Timestamp` column must be RFC 3339.
    /// JSON integers are accepted in a `Float64` column since JSON has a
    /// single number type; any other shape mismatch surfaces as a
    /// [`SchemaError::TypeMismatch`](crate::error::SchemaError::TypeMismatch)
    /// from [`TableBuilder::build`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_json::json;
    /// use tabular_guard::table::{Column, DataType, TableBuilder};
    ///
    /// let records = vec![
    ///     json!({"transaction_id": 100, "amount": 200.0, "country": "Colombia"}),
    ///     json!({"transaction_id": 105, "amount": 50, "country": null}),
    /// ];
    /// let table = TableBuilder::from_json_records(
    ///     "transactions_clean",
    ///     vec![
    ///         Column::new("transaction_id", DataType::Int64),
    ///         Column::new("amount", DataType::Float64),
    ///         Column::new("country", DataType::Utf8),
    ///     ],
    ///     &records,
    /// )?
    /// .build()?;
    ///
    /// assert!(table.value(1, "country").unwrap().is_null());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_json_records(
        name: impl Into<String>,
        columns: Vec<Column>,
        records: &[JsonValue],
    ) -> Result<TableBuilder> {
        let mut rows = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let object = record
                .as_object()
                .ok_or_else(|| GuardError::invalid_record(index, "expected a JSON object"))?;
            let row = columns
                .iter()
                .map(|column| json_value(index, column, object.get(column.name())))
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }
        Ok(TableBuilder::new(name).columns(columns).rows(rows))
    }
}

fn json_value(index: usize, column: &Column, raw: Option<&JsonValue>) -> Result<Value> {
    match raw {
        None | Some(JsonValue::Null) => Ok(Value::Null),
        Some(JsonValue::String(s)) if column.data_type() == DataType::Timestamp => {
            DateTime::parse_from_rfc3339(s)
                .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
                .map_err(|e| {
                    GuardError::invalid_record(
                        index,
                        format!("column '{}': invalid timestamp '{s}': {e}", column.name()),
                    )
                })
        }
        Some(JsonValue::String(s)) => Ok(Value::Str(s.clone())),
        Some(JsonValue::Number(n)) => {
            let value = match (column.data_type(), n.as_i64()) {
                (DataType::Float64, _) | (_, None) => n.as_f64().map(Value::from),
                (_, Some(i)) => Some(Value::Int(i)),
            };
            value.ok_or_else(|| {
                GuardError::invalid_record(
                    index,
                    format!("column '{}': number {n} is out of range", column.name()),
                )
            })
        }
        Some(other) => Err(GuardError::invalid_record(
            index,
            format!("column '{}': unsupported JSON value {other}", column.name()),
        )),
    }
}
