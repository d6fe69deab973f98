//! # Observe Example
//!
//! A small media player publishes typed notifications; a dashboard observes
//! them through a subscriber-scoped registry.
//!
//! Shows:
//! - automatic (serde) and manual notifications
//! - inline and queued delivery
//! - sender filtering
//! - subscriptions ending with the subscriber
//!
//! ## Run
//! ```bash
//! cargo run --example observe
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use notikit::{
    Automatic, Dispatch, Event, Manual, ManualNotification, Notification, NotificationCenter,
    SenderId, SubscriptionHandle, SubscriptionRegistry, ValueMap,
};

#[derive(Serialize, Deserialize, Debug)]
struct PlaybackStarted {
    track: String,
    position: f64,
}

impl Notification for PlaybackStarted {
    type Realization = Automatic;
}

#[derive(Serialize, Deserialize, Debug)]
struct PlaybackStalled;

impl Notification for PlaybackStalled {
    type Realization = Automatic;
}

/// Platform object shared by reference, never copied into the payload.
#[derive(Debug)]
struct MediaItem {
    url: String,
}

struct ItemFailed {
    item: Arc<MediaItem>,
    code: i32,
}

impl ManualNotification for ItemFailed {
    fn from_event(event: &Event) -> Option<Self> {
        let payload = event.payload.as_ref()?;
        Some(Self {
            item: payload.get_opaque::<MediaItem>("item").ok()?,
            code: payload.get_as::<i32>("code").ok()?,
        })
    }

    fn to_payload(&self) -> Option<ValueMap> {
        let mut map = ValueMap::new().with("code", self.code);
        map.insert_opaque("item", Arc::clone(&self.item));
        Some(map)
    }
}

impl Notification for ItemFailed {
    type Realization = Manual;
}

struct Dashboard {
    stalls: AtomicU32,
    subscriptions: SubscriptionRegistry<Dashboard>,
}

impl Dashboard {
    fn new(center: Arc<NotificationCenter>) -> Arc<Self> {
        Arc::new_cyclic(|me| Dashboard {
            stalls: AtomicU32::new(0),
            subscriptions: SubscriptionRegistry::new(me.clone(), center),
        })
    }

    fn on_started(&self, n: PlaybackStarted) {
        println!(" ├─► started {:?} at {:.1}s", n.track, n.position);
    }

    fn on_stalled(&self, _n: PlaybackStalled) {
        let total = self.stalls.fetch_add(1, Ordering::Relaxed) + 1;
        println!(" ├─► stalled (total: {total})");
    }

    fn on_failed(&self, n: ItemFailed) {
        println!(" ├─► item {} failed with code {}", n.item.url, n.code);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let center = NotificationCenter::with_defaults();
    let player = SenderId::new();

    let dashboard = Dashboard::new(center.clone());
    dashboard
        .subscriptions
        .observe(Dashboard::on_started)
        .observe(Dashboard::on_stalled)
        .observe(Dashboard::on_failed);

    // Queued observer that only listens to this player.
    let mut audit = SubscriptionHandle::<PlaybackStarted>::new(center.clone());
    audit.register_from(player, Dispatch::Queue(tokio::runtime::Handle::current()), |n| {
        println!(" │   audit: {} started", n.track);
    });

    println!("Posting:");
    PlaybackStarted {
        track: "intro".into(),
        position: 0.0,
    }
    .emit_from(&*center, player)?;
    PlaybackStalled.emit_to(&*center)?;
    ItemFailed {
        item: Arc::new(MediaItem {
            url: "https://media.example/intro.m4a".into(),
        }),
        code: -11800,
    }
    .emit_to(&*center)?;

    tokio::time::sleep(Duration::from_millis(50)).await;

    println!(" └─► observed names: {:?}", dashboard.subscriptions.names());

    drop(dashboard);
    PlaybackStalled.emit_to(&*center)?;
    println!();
    println!(
        "After drop: {} observer(s) left for stalls",
        center.observer_count(PlaybackStalled::name())
    );
    Ok(())
}
