//! # notikit
//!
//! **Notikit** is a typed publish/subscribe layer over a name-keyed broadcast
//! center.
//!
//! Records are flattened into a flat key → value map to be posted, rebuilt from
//! that map on delivery, and handed to callbacks that are bound to their
//! subscriber through weak references, so a subscription never keeps its
//! subscriber alive and never outlives it.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────┐                                      ┌──────────────────────┐
//!   │ record: N    │                                      │ subscriber: Arc<S>   │
//!   │ (Notification)                                      │  └ SubscriptionRegistry<S>
//!   └──────┬───────┘                                      │     (Weak<S>)        │
//!          │ emit()                                       └──────────┬───────────┘
//!          ▼                                                         │ observe(S::method)
//!   Realization::payload                                             ▼
//!   (Automatic: KeyedEncoder)                              Registration ──► add_observer(N::name())
//!          │                                                         │
//!          ▼                                                         │
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │ Broadcast (NotificationCenter)                                              │
//! │  post(Event{ name, payload: Option<ValueMap>, sender })                     │
//! │  observers[name] ──► Inline (posting thread) | Queue (runtime worker)       │
//! └──────────────────────────────────────┬──────────────────────────────────────┘
//!                                        ▼
//!                           upgrade Weak<S> ── gone ──► skip
//!                                        │
//!                                        ▼
//!                          N::try_construct(&Event)
//!                          (Automatic: KeyedDecoder / EmptyDecoder)
//!                                        │
//!                          Some(n) ──► S::method(&s, n)
//!                          None    ──► refused (logged at debug)
//! ```
//!
//! ### Lifecycle of a subscription
//! ```text
//! observe::<N>(method)
//!   ├─► revoke previous entry for N::name() (if any)
//!   └─► add_observer ──► token stored in the registry
//!
//! remove::<N>() / remove_name(name) / drop(registry)
//!   └─► remove_observer(token): no handler invocation starts afterwards
//! ```
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                                     |
//! |-------------------|-------------------------------------------------------------------|--------------------------------------------------------|
//! | **Values**        | Closed set of payload kinds and the flat payload map.             | [`Value`], [`ValueKind`], [`ValueMap`], [`OpaqueValue`] |
//! | **Codec**         | Record ↔ map through serde, kind-exact, fail-fast.                | [`KeyedEncoder`], [`KeyedDecoder`], [`EmptyDecoder`]   |
//! | **Notifications** | Stable names, construction from events, emission.                 | [`Notification`], [`Automatic`], [`Manual`]            |
//! | **Subscriptions** | Single handles and subscriber-scoped registries.                  | [`SubscriptionHandle`], [`SubscriptionRegistry`]       |
//! | **Center**        | In-process broadcast with inline or queued delivery.              | [`Broadcast`], [`NotificationCenter`], [`Dispatch`]    |
//! | **Errors**        | Typed codec errors with log labels.                               | [`DecodeError`], [`EncodeError`]                       |
//! | **Configuration** | Center settings.                                                  | [`CenterConfig`]                                       |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use notikit::{Automatic, Notification, NotificationCenter, SubscriptionRegistry};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Test {
//!     sval: String,
//!     ival: i64,
//! }
//!
//! impl Notification for Test {
//!     type Realization = Automatic;
//! }
//!
//! struct Listener {
//!     last: AtomicI64,
//!     subscriptions: SubscriptionRegistry<Listener>,
//! }
//!
//! impl Listener {
//!     fn on_test(&self, n: Test) {
//!         assert_eq!(n.sval, "Test");
//!         self.last.store(n.ival, Ordering::SeqCst);
//!     }
//! }
//!
//! let center = NotificationCenter::with_defaults();
//! let listener = Arc::new_cyclic(|me| Listener {
//!     last: AtomicI64::new(0),
//!     subscriptions: SubscriptionRegistry::new(me.clone(), center.clone()),
//! });
//! listener.subscriptions.observe(Listener::on_test);
//!
//! Test { sval: "Test".into(), ival: 1 }.emit_to(&*center)?;
//! assert_eq!(listener.last.load(Ordering::SeqCst), 1);
//!
//! listener.subscriptions.remove::<Test>();
//! Test { sval: "Test".into(), ival: 2 }.emit_to(&*center)?;
//! assert_eq!(listener.last.load(Ordering::SeqCst), 1);
//! # Ok::<(), notikit::EncodeError>(())
//! ```

mod center;
mod codec;
mod error;
mod notifications;
mod subscriptions;
mod values;

// ---- Public re-exports ----

pub use center::{
    Broadcast, CenterConfig, Dispatch, Event, Handler, NotificationCenter, ObserverToken,
    SenderId, default_center,
};
pub use codec::{
    EmptyDecoder, KeyedDecoder, KeyedEncoder, decode, decode_empty, encode, encode_payload,
};
pub use error::{DecodeError, EncodeError, ROOT_FIELD};
pub use notifications::{Automatic, Manual, ManualNotification, Notification, Realization};
pub use subscriptions::{SubscriptionHandle, SubscriptionRegistry};
pub use values::{FromValue, IntoValue, OpaqueValue, Value, ValueKind, ValueMap};
