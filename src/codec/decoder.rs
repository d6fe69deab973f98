//! # KeyedDecoder - ValueMap → record.
//!
//! Walks the record's declared fields in declaration order and hands each
//! present entry to the field's own `Deserialize` impl:
//!
//! - key absent (or holding [`Value::Absent`]) on a required field → [`DecodeError::FieldMissing`]
//! - stored kind differs from the declared kind → [`DecodeError::TypeMismatch`]
//!   (no widening or narrowing between numeric kinds)
//! - nested records, sequences, maps, enums, opaque values → [`DecodeError::UnsupportedShape`]
//!
//! The first failing field aborts the decode. Entries the record does not
//! declare are ignored.

use serde::de::value::BorrowedStrDeserializer;
use serde::de::{DeserializeOwned, DeserializeSeed, Deserializer, Error as _, MapAccess, Visitor};
use serde::forward_to_deserialize_any;

use crate::error::{DecodeError, ROOT_FIELD};
use crate::values::{Value, ValueKind, ValueMap};

/// Decodes a record from `map`.
///
/// Never returns a partially populated record.
pub fn decode<T: DeserializeOwned>(map: &ValueMap) -> Result<T, DecodeError> {
    T::deserialize(KeyedDecoder::new(map))
}

/// Top-level deserializer over one map.
#[derive(Debug, Clone, Copy)]
pub struct KeyedDecoder<'de> {
    map: &'de ValueMap,
}

impl<'de> KeyedDecoder<'de> {
    pub fn new(map: &'de ValueMap) -> Self {
        Self { map }
    }
}

impl<'de> Deserializer<'de> for KeyedDecoder<'de> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, DecodeError> {
        Err(DecodeError::unsupported(ROOT_FIELD))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_map(FieldAccess {
            map: self.map,
            fields: fields.iter(),
            pending: None,
        })
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option seq tuple tuple_struct map enum identifier
    }
}

/// Yields the declared fields that are present in the map, in order.
struct FieldAccess<'de> {
    map: &'de ValueMap,
    fields: std::slice::Iter<'static, &'static str>,
    pending: Option<(&'static str, &'de Value)>,
}

impl<'de> MapAccess<'de> for FieldAccess<'de> {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, DecodeError> {
        for &field in self.fields.by_ref() {
            if let Some(value) = self.map.get(field) {
                self.pending = Some((field, value));
                let key = BorrowedStrDeserializer::<'de, DecodeError>::new(field);
                return seed.deserialize(key).map(Some);
            }
        }
        Ok(None)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, DecodeError> {
        match self.pending.take() {
            Some((field, value)) => seed.deserialize(FieldDecoder { field, value }),
            None => Err(DecodeError::custom("field value requested before its key")),
        }
    }
}

/// Deserializer for one field value.
#[derive(Debug, Clone, Copy)]
struct FieldDecoder<'de> {
    field: &'static str,
    value: &'de Value,
}

impl FieldDecoder<'_> {
    fn mismatch(&self, expected: ValueKind) -> DecodeError {
        match self.value {
            Value::Absent => DecodeError::missing(self.field),
            other => DecodeError::mismatch(self.field, expected, other.kind()),
        }
    }

    fn unsupported(&self) -> DecodeError {
        DecodeError::unsupported(self.field)
    }
}

macro_rules! scalar {
    ($($method:ident => $variant:ident, $visit:ident;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
                match self.value {
                    Value::$variant(v) => visitor.$visit(*v),
                    _ => Err(self.mismatch(ValueKind::$variant)),
                }
            }
        )*
    };
}

macro_rules! reject {
    ($($method:ident),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, DecodeError> {
                Err(self.unsupported())
            }
        )*
    };
}

impl<'de> Deserializer<'de> for FieldDecoder<'de> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.value {
            Value::Bool(v) => visitor.visit_bool(*v),
            Value::I8(v) => visitor.visit_i8(*v),
            Value::I16(v) => visitor.visit_i16(*v),
            Value::I32(v) => visitor.visit_i32(*v),
            Value::I64(v) => visitor.visit_i64(*v),
            Value::U8(v) => visitor.visit_u8(*v),
            Value::U16(v) => visitor.visit_u16(*v),
            Value::U32(v) => visitor.visit_u32(*v),
            Value::U64(v) => visitor.visit_u64(*v),
            Value::F32(v) => visitor.visit_f32(*v),
            Value::F64(v) => visitor.visit_f64(*v),
            Value::String(v) => visitor.visit_borrowed_str(v.as_str()),
            Value::Absent => visitor.visit_none(),
            Value::Opaque(_) => Err(self.unsupported()),
        }
    }

    scalar! {
        deserialize_bool => Bool, visit_bool;
        deserialize_i8 => I8, visit_i8;
        deserialize_i16 => I16, visit_i16;
        deserialize_i32 => I32, visit_i32;
        deserialize_i64 => I64, visit_i64;
        deserialize_u8 => U8, visit_u8;
        deserialize_u16 => U16, visit_u16;
        deserialize_u32 => U32, visit_u32;
        deserialize_u64 => U64, visit_u64;
        deserialize_f32 => F32, visit_f32;
        deserialize_f64 => F64, visit_f64;
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.value {
            Value::String(v) => visitor.visit_borrowed_str(v.as_str()),
            _ => Err(self.mismatch(ValueKind::String)),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.value {
            Value::Absent => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }

    reject! {
        deserialize_i128,
        deserialize_u128,
        deserialize_char,
        deserialize_bytes,
        deserialize_byte_buf,
        deserialize_unit,
        deserialize_seq,
        deserialize_map,
        deserialize_identifier,
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, DecodeError> {
        Err(self.unsupported())
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, DecodeError> {
        Err(self.unsupported())
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, DecodeError> {
        Err(self.unsupported())
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, DecodeError> {
        Err(self.unsupported())
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, DecodeError> {
        Err(self.unsupported())
    }
}
