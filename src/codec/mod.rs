//! Keyed structural codec between records and [`ValueMap`](crate::ValueMap)s.
//!
//! Records opt in by deriving `serde::Serialize` / `serde::Deserialize`; the
//! derive supplies the ordered, compile-time list of field names and kinds, so
//! nothing here inspects types at runtime.
//!
//! ## Contents
//! - [`KeyedEncoder`] flattens a record into a map (one key per field)
//! - [`KeyedDecoder`] rebuilds a record from a map, field by field
//! - [`EmptyDecoder`] rebuilds zero-field records without any map
//!
//! ## Shapes
//! ```text
//! record  ──► struct / unit struct / newtype around one of those
//! field   ──► bool | i8..i64 | u8..u64 | f32 | f64 | String
//!             | Option<field> | newtype around a field
//! other   ──► UnsupportedShape(field)   (sequences, maps, nested structs, enums, ...)
//! ```
//!
//! ## Example
//! ```rust
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Progress {
//!     label: String,
//!     percent: u8,
//! }
//!
//! let p = Progress { label: "sync".into(), percent: 40 };
//! let map = notikit::encode(&p).unwrap();
//! assert_eq!(map.len(), 2);
//! assert_eq!(notikit::decode::<Progress>(&map).unwrap(), p);
//! ```

mod decoder;
mod empty;
mod encoder;

pub use decoder::{KeyedDecoder, decode};
pub use empty::{EmptyDecoder, decode_empty};
pub use encoder::{KeyedEncoder, encode, encode_payload};
