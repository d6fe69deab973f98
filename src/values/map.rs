//! # ValueMap - flat event payload.
//!
//! Maps field names to [`Value`]s. Keys are unique; iteration order is
//! unspecified and nothing in the crate relies on it.
//!
//! Hand-written notification mappings read fields through
//! [`ValueMap::get_as`] and [`ValueMap::get_opaque`], which report the same
//! [`DecodeError`] taxonomy as the keyed decoder.

use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map;
use std::sync::Arc;

use crate::error::DecodeError;

use super::value::{FromValue, IntoValue, OpaqueValue, Value, ValueKind};

/// Flat field-name → value map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    entries: HashMap<String, Value>,
}

impl ValueMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts a value, returning the previous one stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl IntoValue) -> Option<Value> {
        self.entries.insert(key.into(), value.into_value())
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl IntoValue) -> Self {
        self.insert(key, value);
        self
    }

    /// Stores a shared allocation by reference.
    pub fn insert_opaque<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: Arc<T>) {
        self.entries
            .insert(key.into(), Value::Opaque(OpaqueValue::from_arc(value)));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Reads `key` as a `T`, requiring the stored kind to match exactly.
    ///
    /// # Errors
    /// - [`DecodeError::FieldMissing`] if the key is absent or holds [`Value::Absent`]
    /// - [`DecodeError::TypeMismatch`] if the stored kind is not `T::KIND`
    ///
    /// # Example
    /// ```
    /// use notikit::{DecodeError, ValueMap};
    ///
    /// let map = ValueMap::new().with("ival", 1i64);
    /// assert_eq!(map.get_as::<i64>("ival"), Ok(1));
    /// assert!(matches!(map.get_as::<i32>("ival"), Err(DecodeError::TypeMismatch { .. })));
    /// assert!(matches!(map.get_as::<i64>("nope"), Err(DecodeError::FieldMissing { .. })));
    /// ```
    pub fn get_as<T: FromValue>(&self, key: &str) -> Result<T, DecodeError> {
        let value = self.present(key)?;
        T::from_value(value).ok_or_else(|| DecodeError::mismatch(key, T::KIND, value.kind()))
    }

    /// Reads an optional field: missing and [`Value::Absent`] both yield `None`.
    pub fn get_optional<T: FromValue>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        match self.entries.get(key) {
            None | Some(Value::Absent) => Ok(None),
            Some(value) => T::from_value(value)
                .map(Some)
                .ok_or_else(|| DecodeError::mismatch(key, T::KIND, value.kind())),
        }
    }

    /// Reads an opaque field holding a `T`.
    ///
    /// A stored opaque value of another type is reported as a mismatch between
    /// two opaque kinds.
    pub fn get_opaque<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>, DecodeError> {
        match self.present(key)? {
            Value::Opaque(opaque) => opaque
                .downcast::<T>()
                .ok_or_else(|| DecodeError::mismatch(key, ValueKind::Opaque, ValueKind::Opaque)),
            other => Err(DecodeError::mismatch(key, ValueKind::Opaque, other.kind())),
        }
    }

    fn present(&self, key: &str) -> Result<&Value, DecodeError> {
        match self.entries.get(key) {
            None | Some(Value::Absent) => Err(DecodeError::missing(key)),
            Some(value) => Ok(value),
        }
    }
}

impl<K: Into<String>, V: IntoValue> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into_value()))
                .collect(),
        }
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = hash_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = hash_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
