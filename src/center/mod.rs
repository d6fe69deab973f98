//! Broadcast center: the untyped, name-keyed delivery mechanism.
//!
//! This module groups the boundary the typed layer consumes (the
//! [`Broadcast`] trait and the [`Event`] it carries) and an in-process
//! implementation, [`NotificationCenter`].
//!
//! ## Contents
//! - [`Event`] name + optional [`ValueMap`](crate::ValueMap) payload + optional sender
//! - [`Broadcast`] `post` / `add_observer` / `remove_observer`
//! - [`Dispatch`] inline delivery or delivery on a runtime worker queue
//! - [`ObserverToken`], [`SenderId`], [`Handler`]
//! - [`NotificationCenter`], [`CenterConfig`], [`default_center`]
//!
//! ## Quick reference
//! - **Publishers**: [`Notification::emit`](crate::Notification::emit) and friends,
//!   or any caller holding a `Broadcast`.
//! - **Consumers**: [`SubscriptionHandle`](crate::SubscriptionHandle) and
//!   [`SubscriptionRegistry`](crate::SubscriptionRegistry) register handlers;
//!   raw handlers can be added directly with [`Broadcast::add_observer`].

mod broadcast;
mod config;
mod event;
mod notification_center;

pub use broadcast::{Broadcast, Dispatch, Handler, ObserverToken};
pub use config::CenterConfig;
pub use event::{Event, SenderId};
pub use notification_center::{NotificationCenter, default_center};
