//! # Dynamically typed payload values.
//!
//! [`Value`] is a tagged union: every stored value carries its exact kind, so
//! decode-time checks are total and never coerce between numeric widths.
//!
//! ## Example
//! ```rust
//! use notikit::{FromValue, IntoValue, Value, ValueKind};
//!
//! let v = 7i32.into_value();
//! assert_eq!(v.kind(), ValueKind::I32);
//! assert_eq!(i32::from_value(&v), Some(7));
//! assert_eq!(i64::from_value(&v), None); // no widening
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// Kind tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Opaque,
    Absent,
}

impl ValueKind {
    /// Returns the lowercase name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::I8 => "i8",
            ValueKind::I16 => "i16",
            ValueKind::I32 => "i32",
            ValueKind::I64 => "i64",
            ValueKind::U8 => "u8",
            ValueKind::U16 => "u16",
            ValueKind::U32 => "u32",
            ValueKind::U64 => "u64",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::String => "string",
            ValueKind::Opaque => "opaque",
            ValueKind::Absent => "absent",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity-only value stored by reference.
///
/// Used for payload fields that cannot round-trip through a generic map
/// (handles to externally owned objects). Two opaque values are equal only
/// when they point at the same allocation.
#[derive(Clone)]
pub struct OpaqueValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl OpaqueValue {
    /// Wraps a value in a fresh allocation.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Shares an existing allocation; identity is preserved.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: type_name::<T>(),
        }
    }

    /// Returns the shared value if it is a `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    /// Returns `true` if the wrapped value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Type name of the wrapped value (diagnostics only).
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if both values share one allocation.
    pub fn ptr_eq(&self, other: &OpaqueValue) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueValue({})", self.type_name)
    }
}

/// A single payload value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    /// Reference-only value; see [`OpaqueValue`].
    Opaque(OpaqueValue),
    /// Explicit nil (an `Option` field holding `None`).
    Absent,
}

impl Value {
    /// Kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::I8(_) => ValueKind::I8,
            Value::I16(_) => ValueKind::I16,
            Value::I32(_) => ValueKind::I32,
            Value::I64(_) => ValueKind::I64,
            Value::U8(_) => ValueKind::U8,
            Value::U16(_) => ValueKind::U16,
            Value::U32(_) => ValueKind::U32,
            Value::U64(_) => ValueKind::U64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::String(_) => ValueKind::String,
            Value::Opaque(_) => ValueKind::Opaque,
            Value::Absent => ValueKind::Absent,
        }
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

/// Conversion of a field value into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Kind-exact extraction of a field value from a [`Value`].
///
/// Returns `None` unless the stored kind is exactly [`FromValue::KIND`].
pub trait FromValue: Sized {
    /// Kind this type is stored as.
    const KIND: ValueKind;

    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! scalar_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl IntoValue for $ty {
                #[inline]
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }

            impl FromValue for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                #[inline]
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                #[inline]
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

scalar_value! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
}

impl IntoValue for &str {
    #[inline]
    fn into_value(self) -> Value {
        Value::String(self.to_owned())
    }
}

impl IntoValue for OpaqueValue {
    #[inline]
    fn into_value(self) -> Value {
        Value::Opaque(self)
    }
}

impl IntoValue for Value {
    #[inline]
    fn into_value(self) -> Value {
        self
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_exact() {
        let v = Value::I64(5);
        assert_eq!(v.kind(), ValueKind::I64);
        assert_eq!(i64::from_value(&v), Some(5));
        assert_eq!(i32::from_value(&v), None);
        assert_eq!(u64::from_value(&v), None);
    }

    #[test]
    fn test_option_none_is_absent() {
        assert_eq!(None::<u8>.into_value(), Value::Absent);
        assert_eq!(Some(3u8).into_value(), Value::U8(3));
        assert!(Value::Absent.is_absent());
    }

    #[test]
    fn test_opaque_identity() {
        struct Route(&'static str);

        let shared = Arc::new(Route("speaker"));
        let a = OpaqueValue::from_arc(Arc::clone(&shared));
        let b = OpaqueValue::from_arc(Arc::clone(&shared));
        let c = OpaqueValue::new(Route("speaker"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is::<Route>());
        assert!(!a.is::<String>());

        let back = a.downcast::<Route>().expect("downcast");
        assert!(Arc::ptr_eq(&back, &shared));
        assert_eq!(back.0, "speaker");
        assert!(a.downcast::<u32>().is_none());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ValueKind::F32.to_string(), "f32");
        assert_eq!(ValueKind::String.to_string(), "string");
    }
}
