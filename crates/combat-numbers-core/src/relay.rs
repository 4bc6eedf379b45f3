//! The combat number relay.
//!
//! [`CombatNumberRelay`] is what a host talks to. It owns a
//! [`ChannelBinding`] whose handler runs every inbound payload through
//! [`handle_inbound`], and a [`BroadcastGate`] for outbound numbers.
//!
//! # Inbound pipeline
//!
//! ```text
//! bytes --decode/coerce--> CombatNumberEvent --DeliveryFilter--> EffectSink
//!            |                                      |
//!            +-- malformed: dropped                 +-- other context: dropped
//! ```
//!
//! Both drop paths are silent apart from tracing; neither is an error.

use std::sync::Arc;

use combat_numbers_types::{CombatNumberEvent, ContextId};
use tracing::{debug, trace};

use crate::binding::{BindingState, ChannelBinding};
use crate::context::ContextProvider;
use crate::error::RelayError;
use crate::filter::DeliveryFilter;
use crate::flag::SuppressionFlag;
use crate::gate::{BroadcastGate, EmitOutcome};
use crate::sink::EffectSink;
use crate::stats::{RelayStats, RelayStatsSnapshot};
use crate::transport::{MessageHandler, Transport};

/// What the inbound pipeline did with one payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Passed to the sink.
    Delivered,
    /// Decoded, but from a context this participant is not viewing.
    Filtered,
    /// Rejected while decoding.
    Malformed,
}

/// One participant's relay on one channel.
pub struct CombatNumberRelay<T> {
    binding: ChannelBinding<T>,
    gate: BroadcastGate<T>,
    stats: Arc<RelayStats>,
}

impl<T: Transport> CombatNumberRelay<T> {
    /// Build an inactive relay.
    ///
    /// `transport`, `flag`, and `context` are shared with the host; the
    /// relay reads them but never writes them.
    pub fn new(
        channel: impl Into<String>,
        transport: Arc<T>,
        flag: Arc<SuppressionFlag>,
        context: Arc<dyn ContextProvider>,
        sink: Arc<dyn EffectSink>,
    ) -> Self {
        let channel = channel.into();
        let filter = DeliveryFilter::new(context);
        let stats = Arc::new(RelayStats::default());

        let handler = inbound_handler(filter, sink, Arc::clone(&stats), channel.clone());
        let binding = ChannelBinding::new(Arc::clone(&transport), channel.clone(), handler);
        let gate = BroadcastGate::new(transport, channel, flag);

        Self {
            binding,
            gate,
            stats,
        }
    }

    /// Start listening. No-op if already listening.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Transport`] if the transport rejects the
    /// registration.
    pub async fn activate(&self) -> Result<(), RelayError> {
        Ok(self.binding.activate().await?)
    }

    /// Stop listening. No-op if not listening.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Transport`] if the transport rejects the
    /// removal.
    pub async fn deactivate(&self) -> Result<(), RelayError> {
        Ok(self.binding.deactivate().await?)
    }

    /// Broadcast a number unless broadcast is suppressed.
    ///
    /// # Errors
    ///
    /// See [`BroadcastGate::emit`].
    pub async fn emit(
        &self,
        number: f64,
        x: f64,
        y: f64,
        origin_context: ContextId,
    ) -> Result<EmitOutcome, RelayError> {
        let outcome = self.gate.emit(number, x, y, origin_context).await?;
        match outcome {
            EmitOutcome::Sent => self.stats.record_sent(),
            EmitOutcome::Suppressed => self.stats.record_suppressed(),
        }
        Ok(outcome)
    }

    /// Current lifecycle state of the listener.
    pub async fn state(&self) -> BindingState {
        self.binding.state().await
    }

    /// Whether the listener is registered.
    pub async fn is_active(&self) -> bool {
        self.state().await == BindingState::Active
    }

    /// The channel this relay is bound to.
    pub fn channel(&self) -> &str {
        self.gate.channel()
    }

    /// Counters for everything the relay has sent and received.
    pub fn stats(&self) -> RelayStatsSnapshot {
        self.stats.snapshot()
    }
}

impl<T> std::fmt::Debug for CombatNumberRelay<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatNumberRelay")
            .field("binding", &self.binding)
            .field("gate", &self.gate)
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}

/// Wrap the inbound pipeline as a transport handler.
fn inbound_handler(
    filter: DeliveryFilter,
    sink: Arc<dyn EffectSink>,
    stats: Arc<RelayStats>,
    channel: String,
) -> MessageHandler {
    Arc::new(move |data: &[u8]| {
        debug!(channel = %channel, "combat number received");
        handle_inbound(data, &filter, sink.as_ref(), &stats);
    })
}

/// Decode one payload, filter it by context, and hand it to the sink.
pub(crate) fn handle_inbound(
    data: &[u8],
    filter: &DeliveryFilter,
    sink: &dyn EffectSink,
    stats: &RelayStats,
) -> Delivery {
    let event = match CombatNumberEvent::from_json(data) {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "dropping malformed combat number");
            stats.record_malformed();
            return Delivery::Malformed;
        }
    };

    if !filter.accept(&event.origin_context) {
        trace!(
            origin_context = %event.origin_context,
            "combat number is for another context"
        );
        stats.record_filtered();
        return Delivery::Filtered;
    }

    sink.apply(event.combat_number());
    stats.record_delivered();
    Delivery::Delivered
}
