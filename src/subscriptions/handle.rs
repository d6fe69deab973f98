//! # SubscriptionHandle - one typed registration.
//!
//! A [`SubscriptionHandle<N>`] owns at most one registration for the events of
//! notification type `N`. Delivered events are filtered through
//! [`Notification::try_construct`]; only reconstructed notifications reach the
//! callback.
//!
//! ## States
//! ```text
//! Unregistered ──register*──► Registered ──remove / drop──► Unregistered
//!                                 │
//!                                 └──register*──► (previous revoked first) Registered
//! ```
//!
//! ## Rules
//! - Registering again revokes the previous registration before adding the new
//!   one; deliveries never accumulate on one handle.
//! - `remove` is idempotent and a no-op on a handle that never registered.
//! - Dropping the handle revokes its registration.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use notikit::{Automatic, Notification, NotificationCenter, SubscriptionHandle};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Volume {
//!     level: u8,
//! }
//! impl Notification for Volume {
//!     type Realization = Automatic;
//! }
//!
//! let center = NotificationCenter::with_defaults();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let mut handle = SubscriptionHandle::<Volume>::new(center.clone());
//! let s = Arc::clone(&seen);
//! handle.register(move |v| s.lock().unwrap().push(v.level));
//!
//! Volume { level: 3 }.emit_to(&*center).unwrap();
//! handle.remove();
//! Volume { level: 4 }.emit_to(&*center).unwrap();
//!
//! assert_eq!(*seen.lock().unwrap(), vec![3]);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::center::{Broadcast, Dispatch, Event, Handler, SenderId, default_center};
use crate::notifications::Notification;

use super::registration::Registration;

/// Owner of a single typed registration.
pub struct SubscriptionHandle<N: Notification> {
    center: Arc<dyn Broadcast>,
    registration: Option<Registration>,
    _marker: PhantomData<fn(N)>,
}

impl<N: Notification> SubscriptionHandle<N> {
    /// Creates an unregistered handle targeting `center`.
    pub fn new(center: Arc<dyn Broadcast>) -> Self {
        Self {
            center,
            registration: None,
            _marker: PhantomData,
        }
    }

    /// Creates an unregistered handle targeting [`default_center`].
    pub fn with_default_center() -> Self {
        Self::new(default_center())
    }

    /// Delivers every `N` to `callback` on the posting thread.
    pub fn register<F>(&mut self, callback: F)
    where
        F: Fn(N) + Send + Sync + 'static,
    {
        self.register_on(Dispatch::Inline, callback);
    }

    /// Delivers every `N` to `callback` in the given execution context.
    pub fn register_on<F>(&mut self, dispatch: Dispatch, callback: F)
    where
        F: Fn(N) + Send + Sync + 'static,
    {
        self.install(dispatch, None, typed::<N, F>(callback));
    }

    /// Delivers only the `N`s posted by `sender`.
    pub fn register_from<F>(&mut self, sender: SenderId, dispatch: Dispatch, callback: F)
    where
        F: Fn(N) + Send + Sync + 'static,
    {
        self.install(dispatch, Some(sender), typed::<N, F>(callback));
    }

    /// Calls `callback` for every event named [`N::name`](Notification::name),
    /// without reconstructing the payload.
    pub fn register_signal<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register_signal_on(Dispatch::Inline, callback);
    }

    /// Like [`register_signal`](Self::register_signal), delivering in the
    /// given execution context.
    pub fn register_signal_on<F>(&mut self, dispatch: Dispatch, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.install(dispatch, None, Arc::new(move |_ev: &Event| callback()));
    }

    /// Delivers every `N` to `method` on `subscriber`, held weakly.
    ///
    /// Once `subscriber` is dropped, deliveries are skipped; the handle does
    /// not keep it alive.
    pub fn register_method<S, F>(&mut self, subscriber: &Arc<S>, method: F)
    where
        S: Send + Sync + 'static,
        F: Fn(&S, N) + Send + Sync + 'static,
    {
        self.register_method_on(Dispatch::Inline, subscriber, method);
    }

    /// Like [`register_method`](Self::register_method), delivering in the
    /// given execution context.
    pub fn register_method_on<S, F>(
        &mut self,
        dispatch: Dispatch,
        subscriber: &Arc<S>,
        method: F,
    ) where
        S: Send + Sync + 'static,
        F: Fn(&S, N) + Send + Sync + 'static,
    {
        let weak = Arc::downgrade(subscriber);
        self.register_on(dispatch, move |n| {
            if let Some(s) = weak.upgrade() {
                method(&s, n);
            }
        });
    }

    /// Calls the payload-less `method` on `subscriber`, held weakly, for every
    /// event named [`N::name`](Notification::name).
    pub fn register_method_signal<S, F>(&mut self, subscriber: &Arc<S>, method: F)
    where
        S: Send + Sync + 'static,
        F: Fn(&S) + Send + Sync + 'static,
    {
        self.register_method_signal_on(Dispatch::Inline, subscriber, method);
    }

    /// Like [`register_method_signal`](Self::register_method_signal),
    /// delivering in the given execution context.
    pub fn register_method_signal_on<S, F>(
        &mut self,
        dispatch: Dispatch,
        subscriber: &Arc<S>,
        method: F,
    ) where
        S: Send + Sync + 'static,
        F: Fn(&S) + Send + Sync + 'static,
    {
        let weak = Arc::downgrade(subscriber);
        self.register_signal_on(dispatch, move || {
            if let Some(s) = weak.upgrade() {
                method(&s);
            }
        });
    }

    /// Revokes the registration, if any. Idempotent.
    pub fn remove(&mut self) {
        if let Some(mut registration) = self.registration.take() {
            registration.revoke();
        }
    }

    /// Returns true while a registration is held.
    pub fn is_registered(&self) -> bool {
        self.registration.as_ref().is_some_and(Registration::is_live)
    }

    /// Event name this handle observes.
    pub fn name(&self) -> &'static str {
        N::name()
    }

    fn install(&mut self, dispatch: Dispatch, sender: Option<SenderId>, handler: Handler) {
        self.remove();
        self.registration = Some(Registration::add(
            Arc::clone(&self.center),
            N::name(),
            dispatch,
            sender,
            handler,
        ));
    }
}

impl<N: Notification> fmt::Debug for SubscriptionHandle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("name", &N::name())
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// Wraps a typed callback into a raw handler filtering through `try_construct`.
fn typed<N, F>(callback: F) -> Handler
where
    N: Notification,
    F: Fn(N) + Send + Sync + 'static,
{
    Arc::new(move |ev: &Event| {
        if let Some(n) = N::try_construct(ev) {
            callback(n);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::center::NotificationCenter;
    use crate::notifications::Automatic;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Ping {
        n: u32,
    }

    impl Notification for Ping {
        type Realization = Automatic;
    }

    fn counting(hits: &Arc<AtomicUsize>) -> impl Fn(Ping) + Send + Sync + 'static {
        let h = Arc::clone(hits);
        move |_p: Ping| {
            h.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_register_twice_delivers_once() {
        let center = NotificationCenter::with_defaults();
        let hits = Arc::new(AtomicUsize::new(0));
        let mut handle = SubscriptionHandle::<Ping>::new(center.clone());

        handle.register(counting(&hits));
        handle.register(counting(&hits));
        assert_eq!(center.observer_count(Ping::name()), 1);

        Ping { n: 1 }.emit_to(&*center).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let center = NotificationCenter::with_defaults();
        let hits = Arc::new(AtomicUsize::new(0));
        let mut handle = SubscriptionHandle::<Ping>::new(center.clone());

        handle.remove();
        handle.register(counting(&hits));
        assert!(handle.is_registered());
        handle.remove();
        handle.remove();
        assert!(!handle.is_registered());

        Ping { n: 1 }.emit_to(&*center).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(center.observer_count(Ping::name()), 0);
    }

    #[test]
    fn test_drop_revokes() {
        let center = NotificationCenter::with_defaults();
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let mut handle = SubscriptionHandle::<Ping>::new(center.clone());
            handle.register(counting(&hits));
        }
        Ping { n: 1 }.emit_to(&*center).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_undecodable_payload_is_skipped_but_signal_fires() {
        let center = NotificationCenter::with_defaults();
        let typed_hits = Arc::new(AtomicUsize::new(0));
        let signal_hits = Arc::new(AtomicUsize::new(0));

        let mut typed_handle = SubscriptionHandle::<Ping>::new(center.clone());
        typed_handle.register(counting(&typed_hits));

        let mut signal = SubscriptionHandle::<Ping>::new(center.clone());
        let s = Arc::clone(&signal_hits);
        signal.register_signal(move || {
            s.fetch_add(1, Ordering::SeqCst);
        });

        center.post(Event::new(Ping::name()));
        assert_eq!(typed_hits.load(Ordering::SeqCst), 0);
        assert_eq!(signal_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_register_method_does_not_keep_subscriber_alive() {
        struct Counter(AtomicUsize);

        let center = NotificationCenter::with_defaults();
        let subscriber = Arc::new(Counter(AtomicUsize::new(0)));
        let weak = Arc::downgrade(&subscriber);

        let mut handle = SubscriptionHandle::<Ping>::new(center.clone());
        handle.register_method(&subscriber, |c: &Counter, p: Ping| {
            c.0.fetch_add(p.n as usize, Ordering::SeqCst);
        });

        Ping { n: 2 }.emit_to(&*center).unwrap();
        assert_eq!(subscriber.0.load(Ordering::SeqCst), 2);

        drop(subscriber);
        assert!(weak.upgrade().is_none());
        Ping { n: 2 }.emit_to(&*center).unwrap();
    }

    struct Tally {
        calls: Arc<AtomicUsize>,
    }

    impl Tally {
        fn on_signal(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn on_ping(&self, p: Ping) {
            self.calls.fetch_add(p.n as usize, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_method_signal_is_weakly_bound() {
        let center = NotificationCenter::with_defaults();
        let calls = Arc::new(AtomicUsize::new(0));
        let subscriber = Arc::new(Tally {
            calls: Arc::clone(&calls),
        });
        let weak = Arc::downgrade(&subscriber);

        let mut handle = SubscriptionHandle::<Ping>::new(center.clone());
        handle.register_method_signal(&subscriber, Tally::on_signal);

        // Fires even when the payload would not decode.
        center.post(Event::new(Ping::name()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        drop(subscriber);
        assert!(weak.upgrade().is_none());

        Ping { n: 1 }.emit_to(&*center).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(handle.is_registered());
    }

    #[tokio::test]
    async fn test_queued_method_variants_are_weakly_bound() {
        let center = NotificationCenter::with_defaults();
        let calls = Arc::new(AtomicUsize::new(0));
        let subscriber = Arc::new(Tally {
            calls: Arc::clone(&calls),
        });
        let weak = Arc::downgrade(&subscriber);
        let rt = tokio::runtime::Handle::current();

        let mut typed_handle = SubscriptionHandle::<Ping>::new(center.clone());
        typed_handle.register_method_on(Dispatch::Queue(rt.clone()), &subscriber, Tally::on_ping);
        let mut signal = SubscriptionHandle::<Ping>::new(center.clone());
        signal.register_method_signal_on(Dispatch::Queue(rt), &subscriber, Tally::on_signal);

        Ping { n: 10 }.emit_to(&*center).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 11);

        drop(subscriber);
        assert!(weak.upgrade().is_none());

        Ping { n: 10 }.emit_to(&*center).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn test_register_from_filters_sender() {
        let center = NotificationCenter::with_defaults();
        let hits = Arc::new(AtomicUsize::new(0));
        let me = SenderId::new();

        let mut handle = SubscriptionHandle::<Ping>::new(center.clone());
        handle.register_from(me, Dispatch::Inline, counting(&hits));

        Ping { n: 1 }.emit_to(&*center).unwrap();
        Ping { n: 1 }.emit_from(&*center, SenderId::new()).unwrap();
        Ping { n: 1 }.emit_from(&*center, me).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
