//! Typed notifications on top of the untyped [`Event`](crate::Event).
//!
//! A record type becomes a notification by implementing [`Notification`] and
//! picking a [`Realization`] that maps it to and from an event payload.
//!
//! ## Contents
//! - [`Notification`] name, `try_construct`, `to_event`, `emit*`
//! - [`Realization`] strategy interface used by `Notification`
//! - [`Automatic`] serde-derived mapping through the keyed codec
//! - [`Manual`] + [`ManualNotification`] hand-written mapping
//!
//! ## Quick reference
//! ```text
//! emit()          : record ──Realization::payload──► Event{name, payload} ──► Broadcast::post
//! try_construct() : Event ──Realization::construct──► Some(record) | None (refused)
//! ```
//!
//! Publishers and subscribers only ever see the two operations above, so a
//! type can switch realization without touching its call sites.

mod notification;
mod realization;

pub use notification::Notification;
pub use realization::{Automatic, Manual, ManualNotification, Realization};
