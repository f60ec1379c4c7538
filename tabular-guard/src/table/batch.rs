//! Conversion from Arrow record batches.

use super::{Column, DataType, Table, TableBuilder, Value};
use crate::error::{GuardError, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType as ArrowType, Date32Type, Date64Type, Float32Type, Float64Type,
    Int16Type, Int32Type, Int64Type, Int8Type, Schema, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt16Type,
    UInt32Type, UInt8Type,
};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use tracing::debug;

const SECONDS_PER_DAY: i64 = 86_400;

impl Table {
    /// Converts a single record batch into a table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arrow::array::{Float64Array, Int64Array};
    /// use arrow::datatypes::{DataType, Field, Schema};
    /// use arrow::record_batch::RecordBatch;
    /// use std::sync::Arc;
    /// use tabular_guard::table::Table;
    ///
    /// let schema = Arc::new(Schema::new(vec![
    ///     Field::new("transaction_id", DataType::Int64, false),
    ///     Field::new("amount", DataType::Float64, true),
    /// ]));
    /// let batch = RecordBatch::try_new(
    ///     schema,
    ///     vec![
    ///         Arc::new(Int64Array::from(vec![100, 103])),
    ///         Arc::new(Float64Array::from(vec![Some(200.0), None])),
    ///     ],
    /// )?;
    ///
    /// let table = Table::from_record_batch("transactions", &batch)?;
    /// assert!(table.value(1, "amount").unwrap().is_null());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_record_batch(name: impl Into<String>, batch: &RecordBatch) -> Result<Table> {
        Ok(TableBuilder::from_arrow(name, batch.schema_ref(), std::slice::from_ref(batch))?.build()?)
    }
}

impl TableBuilder {
    /// Creates a builder whose schema and rows come from Arrow data.
    ///
    /// `schema` defines the columns even when `batches` is empty. Rows are
    /// appended batch by batch in order.
    ///
    /// Supported Arrow types: Utf8, LargeUtf8 and Utf8View become `Utf8`;
    /// Int8 to Int64 and UInt8 to UInt32 become `Int64`; Float32 and Float64
    /// become `Float64` with NaN read as null; Timestamp (any unit, any time
    /// zone) and Date32/Date64 become `Timestamp` in UTC.
    pub fn from_arrow(
        name: impl Into<String>,
        schema: &Schema,
        batches: &[RecordBatch],
    ) -> Result<TableBuilder> {
        let name = name.into();
        let columns = schema
            .fields()
            .iter()
            .map(|field| {
                column_type(field.data_type())
                    .map(|data_type| Column::new(field.name().clone(), data_type))
                    .ok_or_else(|| GuardError::UnsupportedType {
                        column: field.name().clone(),
                        data_type: field.data_type().to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());
        for batch in batches {
            if batch.num_columns() != columns.len() {
                return Err(GuardError::Arrow(arrow::error::ArrowError::SchemaError(format!(
                    "batch has {} columns, schema has {}",
                    batch.num_columns(),
                    columns.len()
                ))));
            }

            let mut converted = Vec::with_capacity(columns.len());
            for (column, array) in columns.iter().zip(batch.columns()) {
                converted.push(column_values(column.name(), array)?);
            }

            for row in 0..batch.num_rows() {
                rows.push(converted.iter().map(|values| values[row].clone()).collect());
            }
        }

        debug!(
            table = %name,
            columns = columns.len(),
            rows = rows.len(),
            batches = batches.len(),
            "Converted Arrow batches"
        );

        Ok(TableBuilder::new(name).columns(columns).rows(rows))
    }
}

fn column_type(data_type: &ArrowType) -> Option<DataType> {
    match data_type {
        ArrowType::Utf8 | ArrowType::LargeUtf8 | ArrowType::Utf8View => Some(DataType::Utf8),
        ArrowType::Int8
        | ArrowType::Int16
        | ArrowType::Int32
        | ArrowType::Int64
        | ArrowType::UInt8
        | ArrowType::UInt16
        | ArrowType::UInt32 => Some(DataType::Int64),
        ArrowType::Float32 | ArrowType::Float64 => Some(DataType::Float64),
        ArrowType::Timestamp(_, _) | ArrowType::Date32 | ArrowType::Date64 => {
            Some(DataType::Timestamp)
        }
        _ => None,
    }
}

fn column_values(column: &str, array: &ArrayRef) -> Result<Vec<Value>> {
    let values = match array.data_type() {
        ArrowType::Utf8 => strings(array.as_string::<i32>().iter()),
        ArrowType::LargeUtf8 => strings(array.as_string::<i64>().iter()),
        ArrowType::Utf8View => strings(array.as_string_view().iter()),
        ArrowType::Int8 => primitive::<Int8Type>(array, |v| Value::Int(i64::from(v))),
        ArrowType::Int16 => primitive::<Int16Type>(array, |v| Value::Int(i64::from(v))),
        ArrowType::Int32 => primitive::<Int32Type>(array, |v| Value::Int(i64::from(v))),
        ArrowType::Int64 => primitive::<Int64Type>(array, Value::Int),
        ArrowType::UInt8 => primitive::<UInt8Type>(array, |v| Value::Int(i64::from(v))),
        ArrowType::UInt16 => primitive::<UInt16Type>(array, |v| Value::Int(i64::from(v))),
        ArrowType::UInt32 => primitive::<UInt32Type>(array, |v| Value::Int(i64::from(v))),
        ArrowType::Float32 => primitive::<Float32Type>(array, |v| Value::from(f64::from(v))),
        ArrowType::Float64 => primitive::<Float64Type>(array, Value::from),
        ArrowType::Timestamp(TimeUnit::Second, _) => {
            primitive::<TimestampSecondType>(array, |v| instant(DateTime::from_timestamp(v, 0)))
        }
        ArrowType::Timestamp(TimeUnit::Millisecond, _) => {
            primitive::<TimestampMillisecondType>(array, |v| {
                instant(DateTime::from_timestamp_millis(v))
            })
        }
        ArrowType::Timestamp(TimeUnit::Microsecond, _) => {
            primitive::<TimestampMicrosecondType>(array, |v| {
                instant(DateTime::from_timestamp_micros(v))
            })
        }
        ArrowType::Timestamp(TimeUnit::Nanosecond, _) => {
            primitive::<TimestampNanosecondType>(array, |v| {
                Value::Timestamp(DateTime::from_timestamp_nanos(v))
            })
        }
        ArrowType::Date32 => primitive::<Date32Type>(array, |days| {
            instant(DateTime::from_timestamp(i64::from(days) * SECONDS_PER_DAY, 0))
        }),
        ArrowType::Date64 => {
            primitive::<Date64Type>(array, |millis| instant(DateTime::from_timestamp_millis(millis)))
        }
        other => {
            return Err(GuardError::UnsupportedType {
                column: column.to_string(),
                data_type: other.to_string(),
            })
        }
    };
    Ok(values)
}

fn strings<'a>(iter: impl Iterator<Item = Option<&'a str>>) -> Vec<Value> {
    iter.map(|v| v.map_or(Value::Null, Value::from)).collect()
}

fn primitive<T: ArrowPrimitiveType>(array: &ArrayRef, f: impl Fn(T::Native) -> Value) -> Vec<Value> {
    array
        .as_primitive::<T>()
        .iter()
        .map(|v| v.map_or(Value::Null, &f))
        .collect()
}

// Instants outside chrono's range have no representation and read as null.
fn instant(ts: Option<DateTime<Utc>>) -> Value {
    ts.map_or(Value::Null, Value::Timestamp)
}
