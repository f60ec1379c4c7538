//! Cell values and key tuples.

use super::DataType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single cell of a [`Table`](super::Table).
///
/// `Null` is the explicit missing marker. A float NaN is converted to `Null`
/// when it enters a table (and by `From<f64>`), so NaN never participates in
/// sums or comparisons.
///
/// Equality is exact and numeric values compare across representations:
/// `Int(1) == Float(1.0)` and `Float(-0.0) == Float(0.0)`. Two `Null`s are
/// equal as values; the checks exclude null keys on their own and never rely
/// on this.
///
/// Serialized with an explicit type tag, `{"type": "str", "value": "Mexico"}`,
/// so text that looks like a date stays text when read back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Missing value
    Null,
    /// Integral number
    Int(i64),
    /// Floating point number (never NaN inside a table)
    Float(f64),
    /// Instant in UTC
    Timestamp(DateTime<Utc>),
    /// Text
    Str(String),
}

impl Value {
    /// Returns true if this is the null marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the column type this value belongs to, or `None` for null.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(DataType::Int64),
            Value::Float(_) => Some(DataType::Float64),
            Value::Timestamp(_) => Some(DataType::Timestamp),
            Value::Str(_) => Some(DataType::Utf8),
        }
    }

    /// Returns the numeric value as `f64` for `Int` and `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    /// Returns the text for `Str` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Replaces a NaN float with `Null`.
    pub(crate) fn normalized(self) -> Self {
        match self {
            Value::Float(v) if v.is_nan() => Value::Null,
            other => other,
        }
    }

    fn canonical(&self) -> Canonical<'_> {
        match self {
            Value::Null => Canonical::Null,
            Value::Int(v) => Canonical::Int(*v),
            Value::Float(v) => {
                let v = *v;
                // 2^63 is exactly representable; anything below it with no
                // fractional part fits in an i64.
                if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
                    Canonical::Int(v as i64)
                } else if v.is_nan() {
                    Canonical::Float(f64::NAN.to_bits())
                } else {
                    Canonical::Float(v.to_bits())
                }
            }
            Value::Timestamp(ts) => Canonical::Timestamp(ts),
            Value::Str(s) => Canonical::Str(s),
        }
    }
}

#[derive(PartialEq, Eq, Hash)]
enum Canonical<'a> {
    Null,
    Int(i64),
    Float(u64),
    Timestamp(&'a DateTime<Utc>),
    Str(&'a str),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value).normalized()
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// An ordered sequence of values drawn from one or more columns of a row.
///
/// Key tuples are used for uniqueness grouping and join matching. A tuple with
/// any null component never takes part in either.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyTuple(Vec<Value>);

impl KeyTuple {
    /// Creates a key tuple from its components.
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// Returns the components in column order.
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Returns true if any component is null.
    pub fn has_null(&self) -> bool {
        self.0.iter().any(Value::is_null)
    }

    /// Returns the number of components.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for a tuple with no components.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Value>> for KeyTuple {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl fmt::Display for KeyTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{single}"),
            values => {
                write!(f, "(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, ")")
            }
        }
    }
}
