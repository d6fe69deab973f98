//! # Broadcast contract
//!
//! [`Broadcast`] is the narrow interface the typed layer needs from a
//! notification mechanism. [`NotificationCenter`](crate::NotificationCenter) is
//! the in-process implementation; other transports can be plugged in by
//! implementing this trait.
//!
//! ## Contract
//! - `post` delivers to every observer currently registered under the event's
//!   name (and whose sender filter, if any, matches). Fire-and-forget.
//! - `add_observer` returns an [`ObserverToken`] that exclusively owns the
//!   registration; the observer stays registered until the token is passed
//!   back to `remove_observer`.
//! - `remove_observer` must be synchronous: once it returns, no delivery
//!   that has yet to pass the implementation's liveness check reaches the
//!   handler. A delivery on another thread that already passed it may still
//!   run once.
//! - Removing a registration twice is impossible (the token is consumed), and
//!   removing one the implementation no longer knows is a no-op.

use std::sync::Arc;

use tokio::runtime::Handle;

use super::event::{Event, SenderId};

/// Raw event handler.
pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Execution context for deliveries to one observer.
#[derive(Debug, Clone, Default)]
pub enum Dispatch {
    /// Deliver synchronously on the posting thread.
    #[default]
    Inline,
    /// Deliver on a dedicated worker task spawned on this runtime.
    Queue(Handle),
}

impl Dispatch {
    /// Queue dispatch on the runtime this call is made from, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Dispatch::Queue)
    }

    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(self, Dispatch::Inline)
    }
}

/// Registration handle returned by [`Broadcast::add_observer`].
///
/// Not `Clone`: exactly one owner can revoke a registration.
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "dropping the token leaves the observer registered"]
pub struct ObserverToken {
    id: u64,
    name: Arc<str>,
}

impl ObserverToken {
    /// Creates a token; for use by [`Broadcast`] implementations.
    pub fn new(id: u64, name: Arc<str>) -> Self {
        Self { id, name }
    }

    /// Implementation-assigned registration id.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Event name the registration listens to.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Untyped notification mechanism.
pub trait Broadcast: Send + Sync + 'static {
    /// Delivers `event` to the observers registered under `event.name`.
    fn post(&self, event: Event);

    /// Registers `handler` for events named `name`.
    ///
    /// With `sender = Some(id)`, only events posted with that sender are
    /// delivered.
    fn add_observer(
        &self,
        name: &str,
        dispatch: Dispatch,
        sender: Option<SenderId>,
        handler: Handler,
    ) -> ObserverToken;

    /// Revokes a registration. See the module contract.
    fn remove_observer(&self, token: ObserverToken);
}
