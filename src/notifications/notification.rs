//! # Notification trait.
//!
//! Provides [`Notification`], the capability set a record type implements to
//! be published and observed through a [`Broadcast`] center.
//!
//! ## Naming
//! [`Notification::name`] defaults to [`std::any::type_name`], the fully
//! qualified path of the type. Two records with the same short name in
//! different modules therefore get distinct event names, and one type always
//! yields the same name within a build. `type_name` is not guaranteed unique
//! in every case (two versions of one crate in the same build can print the
//! same path); override `name` to bind a fixed, externally defined event name
//! or to disambiguate such types.
//!
//! ## Example
//! ```rust
//! use notikit::{Automatic, Notification};
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
//! let sent = Test { sval: "Test".into(), ival: 1 };
//! let event = sent.to_event().unwrap();
//! assert_eq!(&*event.name, Test::name());
//! assert_eq!(Test::try_construct(&event), Some(sent));
//! ```

use crate::center::{Broadcast, Event, SenderId, default_center};
use crate::error::EncodeError;

use super::realization::Realization;

/// Typed notification.
///
/// Implementors choose a [`Realization`] ([`Automatic`](crate::Automatic) or
/// [`Manual`](crate::Manual)); every other method has a default.
pub trait Notification: Sized + 'static {
    /// Mapping strategy between `Self` and an [`Event`].
    type Realization: Realization<Self>;

    /// Stable event name.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Rebuilds a notification from a delivered event.
    ///
    /// Returns `None` when the payload does not describe a `Self`; subscribers
    /// never see refused events.
    fn try_construct(event: &Event) -> Option<Self> {
        <Self::Realization as Realization<Self>>::construct(event)
    }

    /// Builds the event carrying this notification.
    ///
    /// ### Errors
    /// [`EncodeError`] if a field has no [`Value`](crate::Value) representation.
    fn to_event(&self) -> Result<Event, EncodeError> {
        let payload = <Self::Realization as Realization<Self>>::payload(self)?;
        Ok(Event::new(Self::name()).with_payload_opt(payload))
    }

    /// Posts this notification on the process-wide default center.
    fn emit(&self) -> Result<(), EncodeError> {
        self.emit_to(&*default_center())
    }

    /// Posts this notification on `center`.
    fn emit_to(&self, center: &dyn Broadcast) -> Result<(), EncodeError> {
        center.post(self.to_event()?);
        Ok(())
    }

    /// Posts this notification on `center` on behalf of `sender`.
    ///
    /// Observers registered with a sender filter only see events posted this way.
    fn emit_from(&self, center: &dyn Broadcast, sender: SenderId) -> Result<(), EncodeError> {
        center.post(self.to_event()?.with_sender(sender));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::center::{Dispatch, NotificationCenter};
    use crate::notifications::{Automatic, Manual, ManualNotification};
    use crate::values::ValueMap;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mod audio {
        #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
        pub struct Interrupted {
            pub code: i32,
        }

        impl crate::Notification for Interrupted {
            type Realization = crate::Automatic;
        }
    }

    mod video {
        #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
        pub struct Interrupted {
            pub code: i32,
        }

        impl crate::Notification for Interrupted {
            type Realization = crate::Automatic;
        }
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Resumed;

    impl Notification for Resumed {
        type Realization = Automatic;
    }

    struct Fixed;

    impl ManualNotification for Fixed {
        fn from_event(_event: &Event) -> Option<Self> {
            Some(Fixed)
        }
    }

    impl Notification for Fixed {
        type Realization = Manual;

        fn name() -> &'static str {
            "platform.fixed"
        }
    }

    #[test]
    fn test_names_are_fully_qualified() {
        assert_ne!(audio::Interrupted::name(), video::Interrupted::name());
        assert!(audio::Interrupted::name().ends_with("audio::Interrupted"));
        assert_eq!(audio::Interrupted::name(), audio::Interrupted::name());
        assert_eq!(Fixed::name(), "platform.fixed");
    }

    #[test]
    fn test_zero_field_event_has_no_payload() {
        let event = Resumed.to_event().unwrap();
        assert!(!event.has_payload());
        assert_eq!(Resumed::try_construct(&event), Some(Resumed));
    }

    #[test]
    fn test_refuses_foreign_payload() {
        let event = Event::new(audio::Interrupted::name())
            .with_payload(ValueMap::new().with("code", 1i64));
        assert_eq!(audio::Interrupted::try_construct(&event), None);
    }

    #[test]
    fn test_emit_to_and_from() {
        let center = NotificationCenter::with_defaults();
        let me = SenderId::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = Arc::clone(&hits);
        let token = center.add_observer(
            audio::Interrupted::name(),
            Dispatch::Inline,
            Some(me),
            Arc::new(move |ev: &Event| {
                if audio::Interrupted::try_construct(ev) == Some(audio::Interrupted { code: 4 }) {
                    h.fetch_add(1, Ordering::SeqCst);
                }
            }),
        );

        let n = audio::Interrupted { code: 4 };
        n.emit_to(&*center).unwrap();
        n.emit_from(&*center, me).unwrap();
        video::Interrupted { code: 4 }.emit_from(&*center, me).unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        center.remove_observer(token);
    }
}
