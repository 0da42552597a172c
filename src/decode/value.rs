//! Conversion from store values to field types
//!
//! Integers and floats widen (`Int` into `i64`, `Float` into `f64`). A
//! `Null` cell becomes the type's default, or `None` for `Option<T>`.

use crate::store::Value;

use super::errors::{DecodeError, DecodeResult};

/// A field type a store [`Value`] converts into
pub trait FromValue: Sized {
    /// Type name used in mismatch errors
    const TYPE_NAME: &'static str;

    /// Converts a value, or returns `None` when the types do not match
    fn from_value(value: Value) -> Option<Self>;
}

/// Converts `value` for `field`, reporting a mismatch as a decode error
pub(crate) fn convert<T: FromValue>(field: &'static str, value: Value) -> DecodeResult<T> {
    let actual = value.type_name();
    T::from_value(value).ok_or_else(|| DecodeError::value_type(field, T::TYPE_NAME, actual))
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "value";

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Boolean(v) => Some(v),
            Value::Null => Some(false),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    const TYPE_NAME: &'static str = "int";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(v),
            Value::Null => Some(0),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const TYPE_NAME: &'static str = "long";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Long(v) => Some(v),
            Value::Int(v) => Some(i64::from(v)),
            Value::Null => Some(0),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    const TYPE_NAME: &'static str = "float";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v),
            Value::Null => Some(0.0),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "double";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Double(v) => Some(v),
            Value::Float(v) => Some(f64::from(v)),
            Value::Null => Some(0.0),
            _ => None,
        }
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(v) => Some(v),
            Value::Null => Some(String::new()),
            _ => None,
        }
    }
}

impl FromValue for Vec<u8> {
    const TYPE_NAME: &'static str = "bytes";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bytes(v) => Some(v),
            Value::Null => Some(Vec::new()),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widening() {
        assert_eq!(i64::from_value(Value::Int(7)), Some(7));
        assert_eq!(f64::from_value(Value::Float(1.5)), Some(1.5));
        assert_eq!(i32::from_value(Value::Long(7)), None);
    }

    #[test]
    fn test_null_defaults() {
        assert_eq!(i32::from_value(Value::Null), Some(0));
        assert_eq!(String::from_value(Value::Null), Some(String::new()));
        assert_eq!(Option::<i32>::from_value(Value::Null), Some(None));
        assert_eq!(Option::<i32>::from_value(Value::Int(3)), Some(Some(3)));
    }

    #[test]
    fn test_mismatch_names_field_and_types() {
        let err = convert::<i32>("zip_code", Value::String("94110".into())).unwrap_err();
        assert_eq!(
            err,
            DecodeError::ValueType {
                field: "zip_code",
                expected: "int",
                actual: "string",
            }
        );
    }
}
