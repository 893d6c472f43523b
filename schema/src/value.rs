use crate::{codec::CodecError, types::HostType};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed interval of `Float64` values, laid out as `{ minimum, maximum }`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueRange {
    pub minimum: f64,
    pub maximum: f64,
}

impl ValueRange {
    pub fn new(minimum: f64, maximum: f64) -> Self {
        ValueRange { minimum, maximum }
    }
}

/// This type holds a host-side property value.
///
/// Scalar variants mirror [HostType](enum.HostType.html); array properties
/// carry their elements in [Array](#variant.Array). Values are compared with
/// `==` by setters to detect no-op writes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Range(ValueRange),
    Array(Vec<Value>),
}

impl Value {
    /// Host type of a scalar value, `None` for arrays.
    pub fn host_type(&self) -> Option<HostType> {
        match self {
            Value::Bool(_) => Some(HostType::Bool),
            Value::U8(_) => Some(HostType::U8),
            Value::U32(_) => Some(HostType::U32),
            Value::I32(_) => Some(HostType::I32),
            Value::U64(_) => Some(HostType::U64),
            Value::I64(_) => Some(HostType::I64),
            Value::F32(_) => Some(HostType::F32),
            Value::F64(_) => Some(HostType::F64),
            Value::Range(_) => Some(HostType::ValueRange),
            Value::Array(_) => None,
        }
    }

    /// A convenience method to get the elements out of an [Array](#variant.Array).
    /// Returns `None` for scalar values.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    /// Number of elements of an [Array](#variant.Array), `1` for scalars.
    pub fn len(&self) -> usize {
        match self {
            Value::Array(values) => values.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Range(r) => write!(f, "[{}, {}]", r.minimum, r.maximum),
            Value::Array(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! value_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, CodecError> {
                    match value {
                        Value::$variant(v) => Ok(*v),
                        other => Err(CodecError::UnexpectedValue {
                            expected: stringify!($variant),
                            found: other.to_string(),
                        }),
                    }
                }
            }
        )*
    };
}

/// Typed extraction out of a [Value](enum.Value.html); generated accessor
/// adapters use it to hand typed arguments to implementers.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, CodecError>;
}

value_conversions! {
    bool => Bool,
    u8 => U8,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    ValueRange => Range,
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, CodecError> {
        match value {
            Value::Array(values) => values.iter().map(T::from_value).collect(),
            other => Err(CodecError::UnexpectedValue {
                expected: "Array",
                found: other.to_string(),
            }),
        }
    }
}

#[test]
fn display_renders_arrays_and_ranges() {
    let v = Value::from(vec![1u32, 2, 3]);
    assert_eq!(v.to_string(), "[1, 2, 3]");
    assert_eq!(Value::Range(ValueRange::new(-96.0, 0.0)).to_string(), "[-96, 0]");
}

#[test]
fn typed_extraction() {
    assert_eq!(u32::from_value(&Value::U32(7)), Ok(7));
    assert!(u32::from_value(&Value::F32(7.0)).is_err());
    assert_eq!(
        Vec::<f64>::from_value(&Value::from(vec![1.5f64, 2.5])),
        Ok(vec![1.5, 2.5])
    );
}
