//! # SubscriptionRegistry - subscriber-scoped subscriptions.
//!
//! A [`SubscriptionRegistry<S>`] holds any number of registrations, keyed by
//! event name, on behalf of one subscriber `S`. The subscriber is referenced
//! weakly: the registry never keeps it alive, and is normally stored inside it
//! so both die together.
//!
//! ## Architecture
//! ```text
//! SubscriptionRegistry<S>
//!   ├─ subscriber: Weak<S>
//!   └─ entries: name ──► Registration ──► center observer
//!                                            │
//! delivery ──► upgrade Weak<S> ── gone? ──► skip
//!                  └─ alive ──► try_construct ──► method(&S, N)
//! ```
//!
//! ## Rules
//! - `observe` for a name already present revokes the old registration first;
//!   one post is delivered once, also when `observe` calls race each other.
//! - `remove` revokes and discards the entry; removing an unknown name is a no-op.
//! - Dropping the registry revokes every entry it still owns.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use notikit::{Automatic, Notification, NotificationCenter, SubscriptionRegistry};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Scored {
//!     points: u32,
//! }
//! impl Notification for Scored {
//!     type Realization = Automatic;
//! }
//!
//! struct Scoreboard {
//!     total: AtomicU32,
//!     subscriptions: SubscriptionRegistry<Scoreboard>,
//! }
//!
//! impl Scoreboard {
//!     fn on_scored(&self, n: Scored) {
//!         self.total.fetch_add(n.points, Ordering::SeqCst);
//!     }
//! }
//!
//! let center = NotificationCenter::with_defaults();
//! let board = Arc::new_cyclic(|me| Scoreboard {
//!     total: AtomicU32::new(0),
//!     subscriptions: SubscriptionRegistry::new(me.clone(), center.clone()),
//! });
//! board.subscriptions.observe(Scoreboard::on_scored);
//!
//! Scored { points: 3 }.emit_to(&*center).unwrap();
//! assert_eq!(board.total.load(Ordering::SeqCst), 3);
//!
//! drop(board);
//! assert_eq!(center.observer_count(Scored::name()), 0);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::center::{Broadcast, Dispatch, Event, Handler, default_center};
use crate::notifications::Notification;

use super::registration::Registration;

/// Subscriber-scoped collection of registrations.
pub struct SubscriptionRegistry<S: Send + Sync + 'static> {
    subscriber: Weak<S>,
    center: Arc<dyn Broadcast>,
    entries: Mutex<HashMap<String, Registration>>,
    /// Serializes revoke-then-add so concurrent `observe` calls never overlap.
    install_lock: Mutex<()>,
}

impl<S: Send + Sync + 'static> SubscriptionRegistry<S> {
    /// Creates an empty registry for `subscriber` on `center`.
    ///
    /// Pass the weak reference handed out by [`Arc::new_cyclic`] to store the
    /// registry inside the subscriber itself.
    pub fn new(subscriber: Weak<S>, center: Arc<dyn Broadcast>) -> Self {
        Self {
            subscriber,
            center,
            entries: Mutex::new(HashMap::new()),
            install_lock: Mutex::new(()),
        }
    }

    /// Creates an empty registry for an existing subscriber.
    pub fn for_subscriber(subscriber: &Arc<S>, center: Arc<dyn Broadcast>) -> Self {
        Self::new(Arc::downgrade(subscriber), center)
    }

    /// Creates an empty registry on [`default_center`].
    pub fn with_default_center(subscriber: Weak<S>) -> Self {
        Self::new(subscriber, default_center())
    }

    /// Calls `method` on the subscriber for every `N`, on the posting thread.
    ///
    /// Replaces any previous entry for [`N::name`](Notification::name).
    pub fn observe<N, F>(&self, method: F) -> &Self
    where
        N: Notification,
        F: Fn(&S, N) + Send + Sync + 'static,
    {
        self.observe_on(Dispatch::Inline, method)
    }

    /// Like [`observe`](Self::observe), delivering in the given context.
    pub fn observe_on<N, F>(&self, dispatch: Dispatch, method: F) -> &Self
    where
        N: Notification,
        F: Fn(&S, N) + Send + Sync + 'static,
    {
        let subscriber = self.subscriber.clone();
        let handler: Handler = Arc::new(move |ev: &Event| {
            let Some(s) = subscriber.upgrade() else {
                trace!(event = %ev.name, "subscriber gone; skipping delivery");
                return;
            };
            if let Some(n) = N::try_construct(ev) {
                method(&s, n);
            }
        });
        self.install(N::name(), dispatch, handler)
    }

    /// Calls `method` on the subscriber for every event named `name`, ignoring
    /// any payload.
    pub fn observe_name<F>(&self, name: &str, method: F) -> &Self
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let subscriber = self.subscriber.clone();
        let handler: Handler = Arc::new(move |_ev: &Event| {
            if let Some(s) = subscriber.upgrade() {
                method(&s);
            }
        });
        self.install(name, Dispatch::Inline, handler)
    }

    /// Revokes and discards the entry for `N`. Returns whether one existed.
    pub fn remove<N: Notification>(&self) -> bool {
        self.remove_name(N::name())
    }

    /// Revokes and discards the entry for `name`. Returns whether one existed.
    pub fn remove_name(&self, name: &str) -> bool {
        let removed = self.entries.lock().remove(name);
        match removed {
            Some(registration) => {
                drop(registration);
                debug!(event = name, "subscription removed");
                true
            }
            None => false,
        }
    }

    /// Revokes every entry.
    pub fn clear(&self) {
        let drained: Vec<Registration> = self.entries.lock().drain().map(|(_, r)| r).collect();
        drop(drained);
    }

    /// Returns true if an entry for `N` exists.
    pub fn contains<N: Notification>(&self) -> bool {
        self.contains_name(N::name())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns sorted list of observed event names.
    pub fn names(&self) -> Vec<String> {
        let entries = self.entries.lock();
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Revokes the previous entry for `name`, then registers `handler`.
    fn install(&self, name: &str, dispatch: Dispatch, handler: Handler) -> &Self {
        let _installing = self.install_lock.lock();
        let previous = self.entries.lock().remove(name);
        drop(previous);

        let registration =
            Registration::add(Arc::clone(&self.center), name, dispatch, None, handler);
        let replaced = self.entries.lock().insert(name.to_string(), registration);
        drop(replaced);

        debug!(event = name, "subscription installed");
        self
    }
}

impl<S: Send + Sync + 'static> fmt::Debug for SubscriptionRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("names", &self.names())
            .field("subscriber_alive", &(self.subscriber.strong_count() > 0))
            .finish()
    }
}
