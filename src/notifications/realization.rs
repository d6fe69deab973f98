//! # Realizations: how a notification maps to an event payload.
//!
//! [`Realization`] is the strategy consumed by
//! [`Notification`](crate::Notification). Two implementations exist:
//!
//! - [`Automatic`]: the record derives serde's `Serialize`/`Deserialize` and is
//!   flattened with [`encode_payload`](crate::encode_payload), rebuilt with
//!   [`decode`](crate::decode) (or [`decode_empty`](crate::decode_empty) when
//!   the event carries no payload). Decode failures are swallowed into `None`.
//! - [`Manual`]: the record implements [`ManualNotification`] itself. Used for
//!   payloads that cannot round-trip through a generic map, such as opaque
//!   values shared by reference.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::center::Event;
use crate::codec::{decode, decode_empty, encode_payload};
use crate::error::EncodeError;
use crate::values::ValueMap;

/// Mapping strategy between a notification type `N` and an [`Event`].
pub trait Realization<N> {
    /// Rebuilds `N` from a delivered event; `None` refuses the event.
    fn construct(event: &Event) -> Option<N>;

    /// Builds the payload to post; `None` for payload-less notifications.
    fn payload(notification: &N) -> Result<Option<ValueMap>, EncodeError>;
}

/// Serde-derived realization.
///
/// Zero-field records post no payload, and are rebuilt without a map.
#[derive(Debug, Clone, Copy, Default)]
pub struct Automatic;

impl<N> Realization<N> for Automatic
where
    N: Serialize + DeserializeOwned,
{
    fn construct(event: &Event) -> Option<N> {
        let decoded = match &event.payload {
            Some(map) => decode::<N>(map),
            None => decode_empty::<N>(),
        };
        match decoded {
            Ok(record) => Some(record),
            Err(err) => {
                debug!(
                    event = %event.name,
                    seq = event.seq,
                    error = err.as_label(),
                    field = err.field().unwrap_or_default(),
                    "payload refused"
                );
                None
            }
        }
    }

    fn payload(notification: &N) -> Result<Option<ValueMap>, EncodeError> {
        encode_payload(notification)
    }
}

/// Hand-written realization; see [`ManualNotification`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Manual;

/// Hand-written event mapping for a notification type.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use notikit::{Event, Manual, ManualNotification, Notification, ValueMap};
///
/// struct Surface {
///     id: u32,
/// }
///
/// #[derive(Clone)]
/// struct SurfaceLost {
///     surface: Arc<Surface>,
/// }
///
/// impl ManualNotification for SurfaceLost {
///     fn from_event(event: &Event) -> Option<Self> {
///         let surface = event.payload.as_ref()?.get_opaque::<Surface>("surface").ok()?;
///         Some(Self { surface })
///     }
///
///     fn to_payload(&self) -> Option<ValueMap> {
///         let mut map = ValueMap::new();
///         map.insert_opaque("surface", Arc::clone(&self.surface));
///         Some(map)
///     }
/// }
///
/// impl Notification for SurfaceLost {
///     type Realization = Manual;
/// }
///
/// let sent = SurfaceLost { surface: Arc::new(Surface { id: 7 }) };
/// let event = sent.to_event().unwrap();
/// let got = SurfaceLost::try_construct(&event).unwrap();
/// assert!(Arc::ptr_eq(&got.surface, &sent.surface));
/// assert_eq!(got.surface.id, 7);
/// ```
pub trait ManualNotification: Sized {
    /// Rebuilds the notification from an event; `None` refuses it.
    fn from_event(event: &Event) -> Option<Self>;

    /// Payload to post. Defaults to none.
    fn to_payload(&self) -> Option<ValueMap> {
        None
    }
}

impl<N: ManualNotification> Realization<N> for Manual {
    fn construct(event: &Event) -> Option<N> {
        N::from_event(event)
    }

    fn payload(notification: &N) -> Result<Option<ValueMap>, EncodeError> {
        Ok(notification.to_payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Reading {
        sensor: String,
        value: f64,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Tick;

    #[test]
    fn test_automatic_round_trip() {
        let r = Reading {
            sensor: "t0".into(),
            value: 21.5,
        };
        let payload = <Automatic as Realization<Reading>>::payload(&r).unwrap();
        let event = Event::new("reading").with_payload_opt(payload);
        let back: Option<Reading> = <Automatic as Realization<Reading>>::construct(&event);
        assert_eq!(back, Some(r));
    }

    #[test]
    fn test_automatic_refuses_bad_payload() {
        let event = Event::new("reading").with_payload(
            ValueMap::new()
                .with("sensor", "t0")
                .with("value", 21.5f32),
        );
        let back: Option<Reading> = <Automatic as Realization<Reading>>::construct(&event);
        assert_eq!(back, None);

        let event = Event::new("reading");
        let back: Option<Reading> = <Automatic as Realization<Reading>>::construct(&event);
        assert_eq!(back, None);
    }

    #[test]
    fn test_automatic_zero_field_has_no_payload() {
        let payload = <Automatic as Realization<Tick>>::payload(&Tick).unwrap();
        assert!(payload.is_none());

        let back: Option<Tick> = <Automatic as Realization<Tick>>::construct(&Event::new("tick"));
        assert_eq!(back, Some(Tick));
    }

    struct Marker(u8);

    impl ManualNotification for Marker {
        fn from_event(event: &Event) -> Option<Self> {
            event.payload.as_ref()?.get_as::<u8>("m").ok().map(Marker)
        }
    }

    #[test]
    fn test_manual_default_payload_is_none() {
        let payload = <Manual as Realization<Marker>>::payload(&Marker(3)).unwrap();
        assert!(payload.is_none());

        let event = Event::new("m").with_payload(ValueMap::new().with("m", 3u8));
        let back = <Manual as Realization<Marker>>::construct(&event).map(|m| m.0);
        assert_eq!(back, Some(3));
    }
}
