//! # EmptyDecoder - zero-field records without a map.
//!
//! Used when an event carries no payload at all. It can only produce records
//! that declare no fields (unit structs, `struct E {}`); anything else fails,
//! which is the whole point: no map is allocated to find that out.

use serde::de::{DeserializeOwned, DeserializeSeed, Deserializer, Error as _, MapAccess, Visitor};
use serde::forward_to_deserialize_any;

use crate::error::{DecodeError, ROOT_FIELD};

/// Decodes a zero-field record.
///
/// # Example
/// ```
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct DidBecomeActive;
///
/// #[derive(Deserialize, Debug)]
/// struct Volume { level: f32 }
///
/// assert!(notikit::decode_empty::<DidBecomeActive>().is_ok());
/// assert!(notikit::decode_empty::<Volume>().is_err());
/// ```
pub fn decode_empty<T: DeserializeOwned>() -> Result<T, DecodeError> {
    T::deserialize(EmptyDecoder)
}

/// Deserializer standing in for an absent payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyDecoder;

impl<'de> Deserializer<'de> for EmptyDecoder {
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
        match fields.first() {
            None => visitor.visit_map(NoFields),
            Some(field) => Err(DecodeError::missing(*field)),
        }
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

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option seq tuple tuple_struct map enum identifier ignored_any
    }
}

struct NoFields;

impl<'de> MapAccess<'de> for NoFields {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        _seed: K,
    ) -> Result<Option<K::Value>, DecodeError> {
        Ok(None)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, _seed: V) -> Result<V::Value, DecodeError> {
        Err(DecodeError::custom("empty payload has no values"))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct EmptyUnit;

    #[derive(Deserialize, Debug, PartialEq)]
    struct EmptyBraced {}

    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct NotEmpty {
        val: i32,
    }

    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct OnlyOptional {
        val: Option<i32>,
    }

    #[test]
    fn test_empty_records_decode() {
        assert_eq!(decode_empty::<EmptyUnit>().unwrap(), EmptyUnit);
        assert_eq!(decode_empty::<EmptyBraced>().unwrap(), EmptyBraced {});
        decode_empty::<()>().unwrap();
    }

    #[test]
    fn test_non_empty_record_fails_on_first_field() {
        assert_eq!(
            decode_empty::<NotEmpty>().unwrap_err(),
            DecodeError::missing("val")
        );
        assert_eq!(
            decode_empty::<OnlyOptional>().unwrap_err(),
            DecodeError::missing("val")
        );
    }

    #[test]
    fn test_sequences_and_scalars_fail() {
        assert_eq!(
            decode_empty::<Vec<String>>().unwrap_err(),
            DecodeError::unsupported(ROOT_FIELD)
        );
        assert_eq!(
            decode_empty::<String>().unwrap_err(),
            DecodeError::unsupported(ROOT_FIELD)
        );
    }
}
