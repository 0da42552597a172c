//! Cell values and versioned cells.

use std::fmt;

use chrono::{DateTime, Utc};

/// A decoded cell value as handed out by the store.
///
/// Byte-level column encoding belongs to the store; the mapping layer only
/// sees these typed values.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Boolean,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    &str => String,
    Vec<u8> => Bytes,
}

/// One version of a column: a timestamp and the value written at it.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell<T> {
    pub timestamp: i64,
    pub value: T,
}

impl<T> Cell<T> {
    pub fn new(timestamp: i64, value: T) -> Self {
        Self { timestamp, value }
    }

    /// Write time of the cell, reading the timestamp as milliseconds
    /// since the epoch
    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Converts the value, keeping the timestamp.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Cell<U>, E> {
        Ok(Cell {
            timestamp: self.timestamp,
            value: f(self.value)?,
        })
    }
}

/// A cell of a map-type family, tagged with the qualifier it was stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyCell<T> {
    pub qualifier: String,
    pub timestamp: i64,
    pub value: T,
}

impl<T> FamilyCell<T> {
    pub fn new(qualifier: impl Into<String>, timestamp: i64, value: T) -> Self {
        Self {
            qualifier: qualifier.into(),
            timestamp,
            value,
        }
    }

    /// Converts the value, keeping qualifier and timestamp.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<FamilyCell<U>, E> {
        Ok(FamilyCell {
            qualifier: self.qualifier,
            timestamp: self.timestamp,
            value: f(self.value)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(94110), Value::Int(94110));
        assert_eq!(Value::from(1372272810769i64), Value::Long(1372272810769));
        assert_eq!(Value::from("taton"), Value::String("taton".into()));
        assert_eq!(Value::from(vec![1u8, 2]).type_name(), "bytes");
    }

    #[test]
    fn test_cell_try_map() {
        let cell = Cell::new(2, Value::Int(94131));
        let mapped: Result<Cell<i64>, ()> = cell.try_map(|v| match v {
            Value::Int(v) => Ok(i64::from(v)),
            _ => Err(()),
        });
        assert_eq!(mapped, Ok(Cell::new(2, 94131i64)));
    }

    #[test]
    fn test_written_at() {
        let cell = Cell::new(1_372_272_810_769, Value::Int(1));
        let written = cell.written_at().unwrap();
        assert_eq!(written.timestamp_millis(), 1_372_272_810_769);
        assert_eq!(written.format("%Y-%m-%d").to_string(), "2013-06-26");
    }
}
