//! Typed subscriptions with deterministic unsubscription.
//!
//! ## Contents
//! - [`SubscriptionHandle`] one registration for one notification type
//! - [`SubscriptionRegistry`] many registrations keyed by event name, bound to
//!   one subscriber through a weak reference
//!
//! ## Quick reference
//! - Ad hoc observation of one type: `SubscriptionHandle::<N>::new(center).register(..)`.
//! - Subscriber-owned observation: store a `SubscriptionRegistry<Self>` in the
//!   subscriber (built with `Arc::new_cyclic`) and chain `observe` calls.
//! - Both revoke on drop; both treat repeated or unknown removal as a no-op.

mod handle;
mod registration;
mod registry;

pub use handle::SubscriptionHandle;
pub use registry::SubscriptionRegistry;
