//! Delivery counters.
//!
//! Counters are plain atomics updated on the emit and receive paths. They
//! never influence behaviour; they exist so a host can report what the
//! relay has been doing.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Running counters for one relay.
#[derive(Debug, Default)]
pub struct RelayStats {
    sent: AtomicU64,
    suppressed: AtomicU64,
    delivered: AtomicU64,
    filtered: AtomicU64,
    malformed: AtomicU64,
}

/// Point-in-time copy of [`RelayStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStatsSnapshot {
    /// Numbers handed to the transport.
    pub sent: u64,
    /// Numbers dropped because broadcast was suppressed.
    pub suppressed: u64,
    /// Inbound numbers passed to the sink.
    pub delivered: u64,
    /// Inbound numbers from a context the participant was not viewing.
    pub filtered: u64,
    /// Inbound payloads rejected at decoding.
    pub malformed: u64,
}

impl RelayStats {
    pub(crate) fn record_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_filtered(&self) {
        self.filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    pub fn snapshot(&self) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            sent: self.sent.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}
