//! # Notification center configuration.
//!
//! Provides [`CenterConfig`], the settings of a
//! [`NotificationCenter`](crate::NotificationCenter).
//!
//! ## Sentinel values
//! - `queue_capacity = 0` → clamped to 1

/// Configuration for a notification center.
///
/// ## Field semantics
/// - `queue_capacity`: per-observer queue size for [`Dispatch::Queue`](crate::Dispatch::Queue)
///   observers (min 1)
/// - `isolate_panics`: catch observer panics instead of unwinding into the poster
#[derive(Clone, Debug)]
pub struct CenterConfig {
    /// Capacity of each queued observer's bounded queue.
    ///
    /// When a queue is full, the event is **dropped** for that observer and a
    /// warning is logged. Other observers are not affected.
    pub queue_capacity: usize,

    /// Catch and log panics raised by observer handlers.
    ///
    /// With `false`, a panicking inline handler unwinds through `post`.
    pub isolate_panics: bool,
}

impl CenterConfig {
    /// Returns the queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

impl Default for CenterConfig {
    /// Default configuration:
    ///
    /// - `queue_capacity = 1024`
    /// - `isolate_panics = true`
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            isolate_panics: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cfg = CenterConfig {
            queue_capacity: 0,
            ..CenterConfig::default()
        };
        assert_eq!(cfg.queue_capacity_clamped(), 1);
        assert_eq!(CenterConfig::default().queue_capacity_clamped(), 1024);
    }
}
