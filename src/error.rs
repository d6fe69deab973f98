//! Error types used by the keyed codec.
//!
//! This module defines two error enums:
//!
//! - [`DecodeError`] - raised by [`KeyedDecoder`](crate::KeyedDecoder) and
//!   [`EmptyDecoder`](crate::EmptyDecoder) when a [`ValueMap`](crate::ValueMap)
//!   cannot be turned back into a record.
//! - [`EncodeError`] - raised by [`KeyedEncoder`](crate::KeyedEncoder) when a
//!   record contains a field shape that has no [`Value`](crate::Value) variant.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.
//! Subscription-side operations never fail: removing an unknown or already
//! removed observer is a no-op, so there is no error type for them.

use std::fmt::Display;

use thiserror::Error;

use crate::values::ValueKind;

/// Field name reported when the failing position is the record itself.
pub const ROOT_FIELD: &str = "<root>";

/// # Errors produced while decoding a record from a value map.
///
/// Decoding is fail-fast: the first failing field aborts the whole decode and
/// no partially populated record is ever returned.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A required field has no entry in the map (or its entry is absent).
    #[error("missing field `{field}`")]
    FieldMissing {
        /// Declared name of the field.
        field: String,
    },

    /// The stored value kind differs from the field's declared kind.
    #[error("field `{field}`: expected {expected}, found {actual}")]
    TypeMismatch {
        /// Declared name of the field.
        field: String,
        /// Kind the record declares for this field.
        expected: ValueKind,
        /// Kind actually stored in the map.
        actual: ValueKind,
    },

    /// The field (or the record) has a shape the keyed decoder cannot
    /// represent: sequences, nested records, maps, enums, opaque values.
    #[error("field `{field}`: unsupported shape")]
    UnsupportedShape {
        /// Declared name of the field, or [`ROOT_FIELD`].
        field: String,
    },

    /// Error reported by a hand-written `Deserialize` implementation.
    #[error("{message}")]
    Custom {
        /// Message supplied by the implementation.
        message: String,
    },
}

impl DecodeError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        DecodeError::FieldMissing {
            field: field.into(),
        }
    }

    pub(crate) fn mismatch(field: impl Into<String>, expected: ValueKind, actual: ValueKind) -> Self {
        DecodeError::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    pub(crate) fn unsupported(field: impl Into<String>) -> Self {
        DecodeError::UnsupportedShape {
            field: field.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use notikit::DecodeError;
    ///
    /// let err = DecodeError::FieldMissing { field: "ival".into() };
    /// assert_eq!(err.as_label(), "decode_field_missing");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DecodeError::FieldMissing { .. } => "decode_field_missing",
            DecodeError::TypeMismatch { .. } => "decode_type_mismatch",
            DecodeError::UnsupportedShape { .. } => "decode_unsupported_shape",
            DecodeError::Custom { .. } => "decode_custom",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DecodeError::FieldMissing { field } => format!("missing: {field}"),
            DecodeError::TypeMismatch {
                field,
                expected,
                actual,
            } => format!("mismatch: {field} expected={expected} actual={actual}"),
            DecodeError::UnsupportedShape { field } => format!("unsupported: {field}"),
            DecodeError::Custom { message } => format!("custom: {message}"),
        }
    }

    /// Name of the field the error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            DecodeError::FieldMissing { field }
            | DecodeError::TypeMismatch { field, .. }
            | DecodeError::UnsupportedShape { field } => Some(field),
            DecodeError::Custom { .. } => None,
        }
    }
}

impl serde::de::Error for DecodeError {
    fn custom<T: Display>(msg: T) -> Self {
        DecodeError::Custom {
            message: msg.to_string(),
        }
    }

    fn missing_field(field: &'static str) -> Self {
        DecodeError::missing(field)
    }
}

/// # Errors produced while encoding a record into a value map.
///
/// Records made of supported field kinds never fail to encode. Hitting one of
/// these means the record type itself violates the flat-record contract.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The field (or the record) has no flat representation.
    #[error("field `{field}`: unsupported shape")]
    UnsupportedShape {
        /// Declared name of the field, or [`ROOT_FIELD`].
        field: String,
    },

    /// Error reported by a hand-written `Serialize` implementation.
    #[error("{message}")]
    Custom {
        /// Message supplied by the implementation.
        message: String,
    },
}

impl EncodeError {
    pub(crate) fn unsupported(field: impl Into<String>) -> Self {
        EncodeError::UnsupportedShape {
            field: field.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EncodeError::UnsupportedShape { .. } => "encode_unsupported_shape",
            EncodeError::Custom { .. } => "encode_custom",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EncodeError::UnsupportedShape { field } => format!("unsupported: {field}"),
            EncodeError::Custom { message } => format!("custom: {message}"),
        }
    }
}

impl serde::ser::Error for EncodeError {
    fn custom<T: Display>(msg: T) -> Self {
        EncodeError::Custom {
            message: msg.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_hook_maps_to_field_missing() {
        let err = <DecodeError as serde::de::Error>::missing_field("sval");
        assert_eq!(err, DecodeError::FieldMissing { field: "sval".into() });
        assert_eq!(err.field(), Some("sval"));
    }

    #[test]
    fn test_mismatch_message_names_both_kinds() {
        let err = DecodeError::mismatch("ival", ValueKind::I32, ValueKind::I64);
        assert_eq!(err.to_string(), "field `ival`: expected i32, found i64");
        assert_eq!(err.as_label(), "decode_type_mismatch");
    }

    #[test]
    fn test_encode_labels() {
        assert_eq!(
            EncodeError::unsupported("items").as_label(),
            "encode_unsupported_shape"
        );
        let custom = <EncodeError as serde::ser::Error>::custom("nope");
        assert_eq!(custom.as_message(), "custom: nope");
    }
}
