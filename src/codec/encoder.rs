//! # KeyedEncoder - record → ValueMap.
//!
//! Writes one `field-name → Value` entry per declared field, in declaration
//! order. `None` fields are written as [`Value::Absent`], so the map of a
//! record is empty if and only if the record declares no fields.
//!
//! Any field that is not a supported scalar (see [`crate::codec`]) fails with
//! [`EncodeError::UnsupportedShape`] naming that field. For records accepted by
//! the type system this is a contract violation, not a runtime condition.

use serde::ser::{Impossible, Serialize, SerializeStruct, Serializer};

use crate::error::{EncodeError, ROOT_FIELD};
use crate::values::{Value, ValueMap};

/// Encodes a record into a fresh map.
///
/// Zero-field records produce an empty map.
pub fn encode<T: Serialize + ?Sized>(record: &T) -> Result<ValueMap, EncodeError> {
    record.serialize(KeyedEncoder::new())
}

/// Encodes a record into an event payload: `None` for zero-field records.
pub fn encode_payload<T: Serialize + ?Sized>(record: &T) -> Result<Option<ValueMap>, EncodeError> {
    let map = encode(record)?;
    Ok(if map.is_empty() { None } else { Some(map) })
}

/// Top-level serializer accepting only record shapes.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyedEncoder {
    _priv: (),
}

impl KeyedEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn unsupported(&self) -> EncodeError {
        EncodeError::unsupported(ROOT_FIELD)
    }
}

/// Collects the fields of one record.
pub struct RecordEncoder {
    map: ValueMap,
}

/// Serializer for a single field value.
#[derive(Debug, Clone, Copy)]
struct FieldEncoder {
    field: &'static str,
}

impl FieldEncoder {
    fn unsupported(&self) -> EncodeError {
        EncodeError::unsupported(self.field)
    }
}

macro_rules! reject {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, _v: $ty) -> Result<Self::Ok, Self::Error> {
                Err(self.unsupported())
            }
        )*
    };
}

macro_rules! scalar {
    ($($method:ident: $ty:ty => $variant:ident),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<Self::Ok, Self::Error> {
                Ok(Value::$variant(v))
            }
        )*
    };
}

impl Serializer for KeyedEncoder {
    type Ok = ValueMap;
    type Error = EncodeError;

    type SerializeSeq = Impossible<ValueMap, EncodeError>;
    type SerializeTuple = Impossible<ValueMap, EncodeError>;
    type SerializeTupleStruct = Impossible<ValueMap, EncodeError>;
    type SerializeTupleVariant = Impossible<ValueMap, EncodeError>;
    type SerializeMap = Impossible<ValueMap, EncodeError>;
    type SerializeStruct = RecordEncoder;
    type SerializeStructVariant = Impossible<ValueMap, EncodeError>;

    reject! {
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_i128: i128,
        serialize_u128: u128,
        serialize_f32: f32,
        serialize_f64: f64,
        serialize_char: char,
        serialize_str: &str,
        serialize_bytes: &[u8],
    }

    fn serialize_none(self) -> Result<ValueMap, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<ValueMap, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_unit(self) -> Result<ValueMap, EncodeError> {
        Ok(ValueMap::new())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<ValueMap, EncodeError> {
        Ok(ValueMap::new())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<ValueMap, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<ValueMap, EncodeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<ValueMap, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, EncodeError> {
        Ok(RecordEncoder {
            map: ValueMap::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, EncodeError> {
        Err(self.unsupported())
    }
}

impl SerializeStruct for RecordEncoder {
    type Ok = ValueMap;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        let value = value.serialize(FieldEncoder { field: key })?;
        self.map.insert(key, value);
        Ok(())
    }

    fn end(self) -> Result<ValueMap, EncodeError> {
        Ok(self.map)
    }
}

impl Serializer for FieldEncoder {
    type Ok = Value;
    type Error = EncodeError;

    type SerializeSeq = Impossible<Value, EncodeError>;
    type SerializeTuple = Impossible<Value, EncodeError>;
    type SerializeTupleStruct = Impossible<Value, EncodeError>;
    type SerializeTupleVariant = Impossible<Value, EncodeError>;
    type SerializeMap = Impossible<Value, EncodeError>;
    type SerializeStruct = Impossible<Value, EncodeError>;
    type SerializeStructVariant = Impossible<Value, EncodeError>;

    scalar! {
        serialize_bool: bool => Bool,
        serialize_i8: i8 => I8,
        serialize_i16: i16 => I16,
        serialize_i32: i32 => I32,
        serialize_i64: i64 => I64,
        serialize_u8: u8 => U8,
        serialize_u16: u16 => U16,
        serialize_u32: u32 => U32,
        serialize_u64: u64 => U64,
        serialize_f32: f32 => F32,
        serialize_f64: f64 => F64,
    }

    reject! {
        serialize_i128: i128,
        serialize_u128: u128,
        serialize_char: char,
        serialize_bytes: &[u8],
    }

    fn serialize_str(self, v: &str) -> Result<Value, EncodeError> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_none(self) -> Result<Value, EncodeError> {
        Ok(Value::Absent)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, EncodeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<Value, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, EncodeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Value, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, EncodeError> {
        Err(self.unsupported())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, EncodeError> {
        Err(self.unsupported())
    }
}
