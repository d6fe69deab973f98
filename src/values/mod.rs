//! Untyped payload model carried by the broadcast center.
//!
//! ## Contents
//! - [`Value`], [`ValueKind`] closed set of scalar kinds (plus opaque and absent)
//! - [`OpaqueValue`] identity-only, reference-counted payload value
//! - [`ValueMap`] flat field-name → [`Value`] map used as an event payload
//! - [`IntoValue`], [`FromValue`] kind-exact conversions for hand-written mappings
//!
//! A `ValueMap` is built fresh per encode call and is never mutated once it has
//! been handed to the center inside an [`Event`](crate::Event).

mod map;
mod value;

pub use map::ValueMap;
pub use value::{FromValue, IntoValue, OpaqueValue, Value, ValueKind};
