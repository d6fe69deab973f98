//! Type-erased, self-revoking observer registration.
//!
//! Shared by [`SubscriptionHandle`](crate::SubscriptionHandle) and
//! [`SubscriptionRegistry`](crate::SubscriptionRegistry): owns exactly one
//! [`ObserverToken`] and hands it back to its center when revoked or dropped.

use std::sync::Arc;

use tracing::trace;

use crate::center::{Broadcast, Dispatch, Handler, ObserverToken, SenderId};

/// One live registration with a [`Broadcast`] center.
pub(crate) struct Registration {
    center: Arc<dyn Broadcast>,
    token: Option<ObserverToken>,
}

impl Registration {
    /// Registers `handler` under `name` on `center`.
    pub(crate) fn add(
        center: Arc<dyn Broadcast>,
        name: &str,
        dispatch: Dispatch,
        sender: Option<SenderId>,
        handler: Handler,
    ) -> Self {
        let token = center.add_observer(name, dispatch, sender, handler);
        Self {
            center,
            token: Some(token),
        }
    }

    /// Revokes the registration. Idempotent.
    pub(crate) fn revoke(&mut self) {
        if let Some(token) = self.token.take() {
            trace!(event = token.name(), id = token.id(), "revoking registration");
            self.center.remove_observer(token);
        }
    }

    #[inline]
    pub(crate) fn is_live(&self) -> bool {
        self.token.is_some()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.revoke();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::center::{Event, NotificationCenter};

    #[test]
    fn test_revoke_is_idempotent_and_drop_revokes() {
        let center = NotificationCenter::with_defaults();
        let noop: Handler = Arc::new(|_ev: &Event| {});

        let mut reg = Registration::add(center.clone(), "r", Dispatch::Inline, None, noop.clone());
        assert!(reg.is_live());
        assert_eq!(center.observer_count("r"), 1);

        reg.revoke();
        reg.revoke();
        assert!(!reg.is_live());
        assert_eq!(center.observer_count("r"), 0);

        let reg = Registration::add(center.clone(), "r", Dispatch::Inline, None, noop);
        assert_eq!(center.observer_count("r"), 1);
        drop(reg);
        assert_eq!(center.observer_count("r"), 0);
    }
}
