//! Broadcast suppression flag.
//!
//! A [`SuppressionFlag`] is created once per session and shared (via
//! [`Arc`](std::sync::Arc)) between whoever toggles it and the
//! [`BroadcastGate`](crate::gate::BroadcastGate) that reads it before every
//! send. Each instance is independent, so separate sessions and tests never
//! observe each other's state.
//!
//! The flag only affects emission; a suppressed participant keeps
//! receiving and rendering everyone else's numbers.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shared boolean gate on outbound broadcast. Defaults to not suppressed.
#[derive(Debug, Default)]
pub struct SuppressionFlag {
    suppressed: AtomicBool,
}

impl SuppressionFlag {
    /// Create a flag that is not suppressed.
    pub const fn new() -> Self {
        Self::with_state(false)
    }

    /// Create a flag with an explicit starting state.
    pub const fn with_state(suppressed: bool) -> Self {
        Self {
            suppressed: AtomicBool::new(suppressed),
        }
    }

    /// Whether outbound broadcast is currently suppressed.
    pub fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::Acquire)
    }

    /// Set the suppression state.
    pub fn set_suppressed(&self, suppressed: bool) {
        self.suppressed.store(suppressed, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_not_suppressed() {
        assert!(!SuppressionFlag::new().is_suppressed());
        assert!(!SuppressionFlag::default().is_suppressed());
    }

    #[test]
    fn accepts_a_new_state() {
        let flag = SuppressionFlag::new();
        flag.set_suppressed(true);
        assert!(flag.is_suppressed());
        flag.set_suppressed(false);
        assert!(!flag.is_suppressed());
    }

    #[test]
    fn instances_do_not_share_state() {
        let first = SuppressionFlag::new();
        let second = SuppressionFlag::new();
        first.set_suppressed(true);
        assert!(!second.is_suppressed());
    }

    #[test]
    fn explicit_starting_state() {
        assert!(SuppressionFlag::with_state(true).is_suppressed());
    }
}
