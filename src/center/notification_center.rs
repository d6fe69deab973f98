//! # NotificationCenter - in-process [`Broadcast`] implementation.
//!
//! Observers are kept per event name. `post` snapshots the observers for the
//! event's name, releases the lock, then delivers; handlers may therefore add
//! or remove observers (including themselves) while being invoked.
//!
//! ## Architecture
//! ```text
//! post(Event)
//!     │  snapshot observers[name]           (read lock, then released)
//!     ├──► Inline observer ──► live? ──► handler(&Event)          (posting thread)
//!     └──► Queue observer  ──► try_send ──► [queue] ──► worker ──► live? ──► handler(&Event)
//! ```
//!
//! ## Rules
//! - **Sender filter**: an observer registered with a sender only sees events
//!   posted with that sender.
//! - **Removal**: `remove_observer` cancels the registration's token under the
//!   write lock; every delivery path checks the token right before invoking
//!   the handler, and queue workers exit on cancellation. A concurrent
//!   delivery that passed the check before cancellation may still run once.
//! - **Overflow**: a full observer queue drops the event for that observer (warn).
//! - **Isolation**: handler panics are caught and logged unless
//!   [`CenterConfig::isolate_panics`] is off.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use super::broadcast::{Broadcast, Dispatch, Handler, ObserverToken};
use super::config::CenterConfig;
use super::event::{Event, SenderId};

static DEFAULT_CENTER: Lazy<Arc<NotificationCenter>> =
    Lazy::new(|| NotificationCenter::new(CenterConfig::default()));

/// Process-wide default center.
///
/// Used by [`Notification::emit`](crate::Notification::emit) and the
/// `with_default_center` constructors of the subscription types.
pub fn default_center() -> Arc<NotificationCenter> {
    Arc::clone(&DEFAULT_CENTER)
}

/// Where deliveries for one observer go.
enum Route {
    Inline(Handler),
    Queue(mpsc::Sender<Arc<Event>>),
}

/// One registration.
struct Observer {
    id: u64,
    sender: Option<SenderId>,
    live: CancellationToken,
    route: Route,
}

impl Observer {
    #[inline]
    fn accepts(&self, event: &Event) -> bool {
        match self.sender {
            None => true,
            Some(filter) => event.sender == Some(filter),
        }
    }
}

/// In-process, name-keyed notification center.
pub struct NotificationCenter {
    cfg: CenterConfig,
    observers: RwLock<HashMap<Arc<str>, Vec<Arc<Observer>>>>,
    next_id: AtomicU64,
}

impl NotificationCenter {
    /// Creates a new center.
    pub fn new(cfg: CenterConfig) -> Arc<Self> {
        Arc::new(Self {
            cfg,
            observers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// Creates a center with [`CenterConfig::default`].
    pub fn with_defaults() -> Arc<Self> {
        Self::new(CenterConfig::default())
    }

    /// Number of observers registered under `name`.
    pub fn observer_count(&self, name: &str) -> usize {
        self.observers.read().get(name).map_or(0, Vec::len)
    }

    /// Sorted list of names that have at least one observer.
    pub fn names(&self) -> Vec<String> {
        let observers = self.observers.read();
        let mut names: Vec<String> = observers.keys().map(|n| n.to_string()).collect();
        names.sort_unstable();
        names
    }

    /// Spawns the worker for a queued observer and returns its queue.
    fn spawn_worker(
        &self,
        rt: &Handle,
        name: Arc<str>,
        id: u64,
        handler: Handler,
        live: CancellationToken,
    ) -> mpsc::Sender<Arc<Event>> {
        let (tx, mut rx) = mpsc::channel::<Arc<Event>>(self.cfg.queue_capacity_clamped());
        let isolate = self.cfg.isolate_panics;

        rt.spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = live.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Some(ev) => {
                            if live.is_cancelled() {
                                break;
                            }
                            invoke(&handler, &ev, isolate);
                        }
                        None => break,
                    }
                }
            }
            trace!(event = %name, id, "observer worker stopped");
        });

        tx
    }
}

impl Broadcast for NotificationCenter {
    fn post(&self, event: Event) {
        let targets: Vec<Arc<Observer>> = {
            let observers = self.observers.read();
            match observers.get(&*event.name) {
                Some(list) => list.clone(),
                None => {
                    trace!(event = %event.name, seq = event.seq, "posted without observers");
                    return;
                }
            }
        };

        let event = Arc::new(event);
        for observer in targets {
            if !observer.accepts(&event) {
                continue;
            }
            match &observer.route {
                Route::Inline(handler) => {
                    if observer.live.is_cancelled() {
                        continue;
                    }
                    invoke(handler, &event, self.cfg.isolate_panics);
                }
                Route::Queue(tx) => match tx.try_send(Arc::clone(&event)) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(
                            event = %event.name,
                            observer = observer.id,
                            "observer dropped event: queue full"
                        );
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        // Worker already gone; the observer is being removed.
                        trace!(event = %event.name, observer = observer.id, "observer queue closed");
                    }
                },
            }
        }
    }

    fn add_observer(
        &self,
        name: &str,
        dispatch: Dispatch,
        sender: Option<SenderId>,
        handler: Handler,
    ) -> ObserverToken {
        let id = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
        let name: Arc<str> = Arc::from(name);
        let live = CancellationToken::new();

        let route = match dispatch {
            Dispatch::Inline => Route::Inline(handler),
            Dispatch::Queue(rt) => Route::Queue(self.spawn_worker(
                &rt,
                Arc::clone(&name),
                id,
                handler,
                live.clone(),
            )),
        };

        let observer = Arc::new(Observer {
            id,
            sender,
            live,
            route,
        });
        self.observers
            .write()
            .entry(Arc::clone(&name))
            .or_default()
            .push(observer);

        debug!(event = %name, id, "observer added");
        ObserverToken::new(id, name)
    }

    fn remove_observer(&self, token: ObserverToken) {
        let mut observers = self.observers.write();
        let Some(list) = observers.get_mut(token.name()) else {
            return;
        };
        if let Some(pos) = list.iter().position(|o| o.id == token.id()) {
            let observer = list.remove(pos);
            observer.live.cancel();
            debug!(event = %token.name(), id = token.id(), "observer removed");
        }
        if list.is_empty() {
            observers.remove(token.name());
        }
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        for list in self.observers.get_mut().values() {
            for observer in list {
                observer.live.cancel();
            }
        }
    }
}

/// Runs a handler, optionally catching its panic.
fn invoke(handler: &Handler, event: &Event, isolate: bool) {
    if !isolate {
        handler(event);
        return;
    }
    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler(event))) {
        error!(
            event = %event.name,
            seq = event.seq,
            panic = %panic_message(panic.as_ref()),
            "observer panicked"
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counter() -> (Arc<AtomicUsize>, Handler) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let handler: Handler = Arc::new(move |_ev: &Event| {
            h.fetch_add(1, AtomicOrdering::SeqCst);
        });
        (hits, handler)
    }

    #[test]
    fn test_inline_delivery_by_name() {
        let center = NotificationCenter::with_defaults();
        let (hits, handler) = counter();
        let _token = center.add_observer("a", Dispatch::Inline, None, handler);

        center.post(Event::new("a"));
        center.post(Event::new("b"));
        center.post(Event::new("a"));

        assert_eq!(hits.load(AtomicOrdering::SeqCst), 2);
        assert_eq!(center.observer_count("a"), 1);
        assert_eq!(center.names(), vec!["a".to_string()]);
    }

    #[test]
    fn test_sender_filter() {
        let center = NotificationCenter::with_defaults();
        let me = SenderId::new();
        let other = SenderId::new();
        let (hits, handler) = counter();
        let _token = center.add_observer("a", Dispatch::Inline, Some(me), handler);

        center.post(Event::new("a"));
        center.post(Event::new("a").with_sender(other));
        center.post(Event::new("a").with_sender(me));

        assert_eq!(hits.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_remove_stops_delivery() {
        let center = NotificationCenter::with_defaults();
        let (hits, handler) = counter();
        let token = center.add_observer("a", Dispatch::Inline, None, handler);

        center.post(Event::new("a"));
        center.remove_observer(token);
        center.post(Event::new("a"));

        assert_eq!(hits.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(center.observer_count("a"), 0);
        assert!(center.names().is_empty());
    }

    #[test]
    fn test_remove_unknown_token_is_noop() {
        let center = NotificationCenter::with_defaults();
        let (hits, handler) = counter();
        let _token = center.add_observer("a", Dispatch::Inline, None, handler);

        center.remove_observer(ObserverToken::new(9_999, Arc::from("a")));
        center.remove_observer(ObserverToken::new(1, Arc::from("missing")));
        center.post(Event::new("a"));

        assert_eq!(hits.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_remove_another_observer_mid_post() {
        let center = NotificationCenter::with_defaults();
        let (late_hits, late) = counter();
        let slot: Arc<parking_lot::Mutex<Option<ObserverToken>>> = Arc::default();

        let c = Arc::clone(&center);
        let s = Arc::clone(&slot);
        let _first = center.add_observer(
            "a",
            Dispatch::Inline,
            None,
            Arc::new(move |_ev: &Event| {
                if let Some(token) = s.lock().take() {
                    c.remove_observer(token);
                }
            }),
        );
        *slot.lock() = Some(center.add_observer("a", Dispatch::Inline, None, late));

        // The second observer is in the snapshot but revoked before its turn.
        center.post(Event::new("a"));
        assert_eq!(late_hits.load(AtomicOrdering::SeqCst), 0);
        assert_eq!(center.observer_count("a"), 1);
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let center = NotificationCenter::with_defaults();
        let (hits, handler) = counter();
        let _bad = center.add_observer(
            "a",
            Dispatch::Inline,
            None,
            Arc::new(|_ev: &Event| panic!("boom")),
        );
        let _good = center.add_observer("a", Dispatch::Inline, None, handler);

        center.post(Event::new("a"));
        assert_eq!(hits.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_queued_delivery() {
        let center = NotificationCenter::with_defaults();
        let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
        let _token = center.add_observer(
            "q",
            Dispatch::Queue(Handle::current()),
            None,
            Arc::new(move |ev: &Event| {
                let _ = tx.send(ev.seq);
            }),
        );

        let ev = Event::new("q");
        let seq = ev.seq;
        center.post(ev);

        let got = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out")
            .expect("closed");
        assert_eq!(got, seq);
    }

    #[tokio::test]
    async fn test_queued_observer_skips_after_remove() {
        let center = NotificationCenter::with_defaults();
        let (hits, handler) = counter();
        let token = center.add_observer("q", Dispatch::Queue(Handle::current()), None, handler);

        // Queued but not yet processed: the worker has not been polled.
        center.post(Event::new("q"));
        center.remove_observer(token);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(hits.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_queue_overflow_drops_for_that_observer() {
        let center = NotificationCenter::new(CenterConfig {
            queue_capacity: 1,
            ..CenterConfig::default()
        });
        let (hits, handler) = counter();
        let _token = center.add_observer("q", Dispatch::Queue(Handle::current()), None, handler);

        for _ in 0..3 {
            center.post(Event::new("q"));
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(hits.load(AtomicOrdering::SeqCst), 1);

        center.post(Event::new("q"));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(hits.load(AtomicOrdering::SeqCst), 2);
    }
}
