//! # Events carried by the broadcast center.
//!
//! An [`Event`] is the only thing the center moves around: a name, an optional
//! flat payload, and an optional sender identity used for observer filtering.
//!
//! ## Ordering
//! Each event gets a process-wide sequence number (`seq`) at construction.
//! It is informational (logs); the center does not reorder by it.
//!
//! ## Example
//! ```rust
//! use notikit::{Event, SenderId, ValueMap};
//!
//! let player = SenderId::new();
//! let ev = Event::new("player.stalled")
//!     .with_payload(ValueMap::new().with("position", 12.5f64))
//!     .with_sender(player);
//!
//! assert_eq!(&*ev.name, "player.stalled");
//! assert_eq!(ev.sender, Some(player));
//! assert!(ev.payload.is_some());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::values::ValueMap;

/// Global sequence counter for events.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Global counter for sender identities.
static SENDER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Identity of an event producer.
///
/// Only compared for equality; carries no data. Observers registered with a
/// sender filter only see events posted with that exact identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SenderId(u64);

impl SenderId {
    /// Allocates a new, process-unique identity.
    #[must_use]
    pub fn new() -> Self {
        Self(SENDER_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for SenderId {
    fn default() -> Self {
        Self::new()
    }
}

/// Named broadcast unit with an optional payload.
///
/// - `name`: event name observers register against
/// - `payload`: `None` for payload-less events (zero-field records)
/// - `sender`: optional producer identity
#[derive(Debug, Clone)]
pub struct Event {
    /// Monotonic sequence number.
    pub seq: u64,
    /// Wall-clock creation time.
    pub at: SystemTime,
    /// Event name.
    pub name: Arc<str>,
    /// Flat key → value payload.
    pub payload: Option<ValueMap>,
    /// Producer identity, if any.
    pub sender: Option<SenderId>,
}

impl Event {
    /// Creates a payload-less event with the next sequence number.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            name: name.into(),
            payload: None,
            sender: None,
        }
    }

    /// Attaches a payload.
    #[inline]
    pub fn with_payload(mut self, payload: ValueMap) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Replaces the payload (possibly with none).
    #[inline]
    pub fn with_payload_opt(mut self, payload: Option<ValueMap>) -> Self {
        self.payload = payload;
        self
    }

    /// Attaches a sender identity.
    #[inline]
    pub fn with_sender(mut self, sender: SenderId) -> Self {
        self.sender = Some(sender);
        self
    }

    #[inline]
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new("a");
        let b = Event::new("b");
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_sender_ids_are_unique() {
        let a = SenderId::new();
        let b = SenderId::new();
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn test_payload_builders() {
        let ev = Event::new("x").with_payload(ValueMap::new().with("k", 1u8));
        assert!(ev.has_payload());
        let ev = ev.with_payload_opt(None);
        assert!(!ev.has_payload());
    }
}
