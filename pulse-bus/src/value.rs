//! Values carried in signal bodies and property replies.
//!
//! [`Value`] is the dynamically typed form a transport hands to the core;
//! [`FromValue`] converts it back into concrete Rust types and reports a
//! [`BusError::TypeMismatch`] naming both D-Bus signatures when it cannot.

use std::collections::HashMap;
use std::fmt;

use crate::error::BusError;
use crate::path::ObjectPath;

/// Type of a [`Value`], rendered as a D-Bus signature by `Display`.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum ValueKind {
    Bool,
    Byte,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Double,
    Str,
    Path,
    /// Homogeneous array of the inner kind
    Array(Box<ValueKind>),
    /// Dictionary with the given key and value kinds
    Dict(Box<ValueKind>, Box<ValueKind>),
}

impl ValueKind {
    /// Array of `element`.
    pub fn array(element: ValueKind) -> Self {
        ValueKind::Array(Box::new(element))
    }

    /// Dictionary from `key` to `value`.
    pub fn dict(key: ValueKind, value: ValueKind) -> Self {
        ValueKind::Dict(Box::new(key), Box::new(value))
    }

    /// D-Bus signature of this kind, e.g. `au` for an array of `u32`.
    pub fn signature(&self) -> String {
        match self {
            ValueKind::Bool => "b".to_string(),
            ValueKind::Byte => "y".to_string(),
            ValueKind::Int32 => "i".to_string(),
            ValueKind::Uint32 => "u".to_string(),
            ValueKind::Int64 => "x".to_string(),
            ValueKind::Uint64 => "t".to_string(),
            ValueKind::Double => "d".to_string(),
            ValueKind::Str => "s".to_string(),
            ValueKind::Path => "o".to_string(),
            ValueKind::Array(element) => format!("a{}", element.signature()),
            ValueKind::Dict(key, value) => {
                format!("a{{{}{}}}", key.signature(), value.signature())
            }
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

/// A dynamically typed bus value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(u8),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Double(f64),
    Str(String),
    Path(ObjectPath),
    /// Array items; `element` keeps the type of empty arrays
    Array {
        element: ValueKind,
        items: Vec<Value>,
    },
    /// Dictionary entries in wire order
    Dict {
        key: ValueKind,
        value: ValueKind,
        entries: Vec<(Value, Value)>,
    },
}

impl Value {
    /// Type of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Byte(_) => ValueKind::Byte,
            Value::Int32(_) => ValueKind::Int32,
            Value::Uint32(_) => ValueKind::Uint32,
            Value::Int64(_) => ValueKind::Int64,
            Value::Uint64(_) => ValueKind::Uint64,
            Value::Double(_) => ValueKind::Double,
            Value::Str(_) => ValueKind::Str,
            Value::Path(_) => ValueKind::Path,
            Value::Array { element, .. } => ValueKind::array(element.clone()),
            Value::Dict { key, value, .. } => ValueKind::dict(key.clone(), value.clone()),
        }
    }

    /// Build a typed array value from any convertible items.
    pub fn array<T: Into<Value> + FromValue>(items: Vec<T>) -> Self {
        Value::Array {
            element: T::kind(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Convert into a concrete type.
    pub fn get<T: FromValue>(&self) -> Result<T, BusError> {
        T::from_value(self)
    }

    fn mismatch(&self, expected: ValueKind) -> BusError {
        BusError::TypeMismatch {
            expected: expected.signature(),
            found: self.kind().signature(),
        }
    }
}

/// Conversion from a [`Value`] into a concrete Rust type.
pub trait FromValue: Sized {
    /// Kind this type is decoded from.
    fn kind() -> ValueKind;

    /// Decode `value`, failing with [`BusError::TypeMismatch`] on the wrong kind.
    fn from_value(value: &Value) -> Result<Self, BusError>;
}

macro_rules! scalar_value {
    ($ty:ty, $variant:ident) => {
        impl FromValue for $ty {
            fn kind() -> ValueKind {
                ValueKind::$variant
            }

            fn from_value(value: &Value) -> Result<Self, BusError> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    other => Err(other.mismatch(Self::kind())),
                }
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

scalar_value!(bool, Bool);
scalar_value!(u8, Byte);
scalar_value!(i32, Int32);
scalar_value!(u32, Uint32);
scalar_value!(i64, Int64);
scalar_value!(u64, Uint64);
scalar_value!(f64, Double);
scalar_value!(String, Str);
scalar_value!(ObjectPath, Path);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn kind() -> ValueKind {
        ValueKind::array(T::kind())
    }

    fn from_value(value: &Value) -> Result<Self, BusError> {
        match value {
            Value::Array { element, items } if *element == T::kind() => {
                items.iter().map(T::from_value).collect()
            }
            other => Err(other.mismatch(Self::kind())),
        }
    }
}

impl<T: Into<Value> + FromValue> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items)
    }
}

impl<V: FromValue> FromValue for HashMap<String, V> {
    fn kind() -> ValueKind {
        ValueKind::dict(ValueKind::Str, V::kind())
    }

    fn from_value(value: &Value) -> Result<Self, BusError> {
        match value {
            Value::Dict {
                key: ValueKind::Str,
                value: kind,
                entries,
            } if *kind == V::kind() => entries
                .iter()
                .map(|(k, v)| Ok((String::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(other.mismatch(Self::kind())),
        }
    }
}

impl<V: Into<Value> + FromValue> From<HashMap<String, V>> for Value {
    fn from(map: HashMap<String, V>) -> Self {
        let mut entries: Vec<(Value, Value)> = map
            .into_iter()
            .map(|(k, v)| (Value::Str(k), v.into()))
            .collect();
        // Stable order for comparisons and logs
        entries.sort_by(|a, b| match (&a.0, &b.0) {
            (Value::Str(x), Value::Str(y)) => x.cmp(y),
            _ => std::cmp::Ordering::Equal,
        });
        Value::Dict {
            key: ValueKind::Str,
            value: V::kind(),
            entries,
        }
    }
}
