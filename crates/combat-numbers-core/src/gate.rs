//! Outbound side of the relay.
//!
//! [`BroadcastGate::emit`] checks the shared [`SuppressionFlag`] before
//! anything else. While the flag is set, emission is a silent no-op: the
//! transport is not touched and nothing is buffered, so numbers emitted
//! during suppression are gone for good.

use std::sync::Arc;

use combat_numbers_types::{CombatNumberEvent, ContextId};
use tracing::{debug, trace};

use crate::error::RelayError;
use crate::flag::SuppressionFlag;
use crate::transport::Transport;

/// What happened to an emitted number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// The event was handed to the transport.
    Sent,
    /// Broadcast is suppressed; nothing was sent.
    Suppressed,
}

/// Suppression-aware sender for one channel.
pub struct BroadcastGate<T> {
    transport: Arc<T>,
    channel: String,
    flag: Arc<SuppressionFlag>,
}

impl<T: Transport> BroadcastGate<T> {
    /// Create a gate sending on `channel` through `transport`.
    pub fn new(transport: Arc<T>, channel: impl Into<String>, flag: Arc<SuppressionFlag>) -> Self {
        Self {
            transport,
            channel: channel.into(),
            flag,
        }
    }

    /// Broadcast a combat number produced in `origin_context`.
    ///
    /// Exactly one transport send happens per call unless suppressed, in
    /// which case none does. The only check on the inputs is the one the
    /// wire format imposes: every number must be finite.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Transport`] with the transport's own error if
    /// the send fails, or [`RelayError::Encode`] if a number is `NaN` or
    /// infinite. Nothing is sent in the latter case.
    pub async fn emit(
        &self,
        number: f64,
        x: f64,
        y: f64,
        origin_context: ContextId,
    ) -> Result<EmitOutcome, RelayError> {
        if self.flag.is_suppressed() {
            trace!(channel = %self.channel, "broadcast suppressed, dropping combat number");
            return Ok(EmitOutcome::Suppressed);
        }

        let event = CombatNumberEvent::new(number, x, y, origin_context);
        let payload = event.to_json()?;

        debug!(
            channel = %self.channel,
            origin_context = %event.origin_context,
            "emitting combat number"
        );
        self.transport.send(&self.channel, payload).await?;
        Ok(EmitOutcome::Sent)
    }

    /// The channel this gate sends on.
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl<T> std::fmt::Debug for BroadcastGate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastGate")
            .field("channel", &self.channel)
            .field("suppressed", &self.flag.is_suppressed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use combat_numbers_types::COMBAT_NUMBERS_CHANNEL;

    use super::*;
    use crate::error::TransportError;
    use crate::transport::MessageHandler;

    /// Records every send instead of delivering it.
    #[derive(Default)]
    struct RecordingTransport {
        sent: StdMutex<Vec<(String, Vec<u8>)>>,
        fail: bool,
    }

    impl Transport for RecordingTransport {
        async fn send(&self, channel: &str, payload: Vec<u8>) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::Unavailable {
                    message: "offline".to_owned(),
                });
            }
            self.sent.lock().unwrap().push((channel.to_owned(), payload));
            Ok(())
        }

        async fn subscribe(&self, _: &str, _: MessageHandler) -> Result<(), TransportError> {
            Ok(())
        }

        async fn unsubscribe(&self, _: &str) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn gate(transport: &Arc<RecordingTransport>, flag: &Arc<SuppressionFlag>) -> BroadcastGate<RecordingTransport> {
        BroadcastGate::new(Arc::clone(transport), COMBAT_NUMBERS_CHANNEL, Arc::clone(flag))
    }

    #[tokio::test]
    async fn suppressed_emits_never_reach_the_transport() {
        let transport = Arc::new(RecordingTransport::default());
        let flag = Arc::new(SuppressionFlag::new());
        let gate = gate(&transport, &flag);

        flag.set_suppressed(true);
        for i in 0..5 {
            let outcome = gate
                .emit(f64::from(i), 1.0, 2.0, ContextId::new("scene1"))
                .await
                .unwrap();
            assert_eq!(outcome, EmitOutcome::Suppressed);
        }
        assert!(transport.sent.lock().unwrap().is_empty());

        flag.set_suppressed(false);
        let outcome = gate
            .emit(9.0, 3.0, 4.0, ContextId::new("scene1"))
            .await
            .unwrap();
        assert_eq!(outcome, EmitOutcome::Sent);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (channel, payload) = sent.first().unwrap();
        assert_eq!(channel, COMBAT_NUMBERS_CHANNEL);
        let event = CombatNumberEvent::from_json(payload).unwrap();
        assert_eq!(
            event,
            CombatNumberEvent::new(9.0, 3.0, 4.0, ContextId::new("scene1"))
        );
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let transport = Arc::new(RecordingTransport {
            fail: true,
            ..RecordingTransport::default()
        });
        let flag = Arc::new(SuppressionFlag::new());
        let err = gate(&transport, &flag)
            .emit(1.0, 1.0, 1.0, ContextId::new("s"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RelayError::Transport(TransportError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn suppressed_emit_ignores_broken_transport() {
        let transport = Arc::new(RecordingTransport {
            fail: true,
            ..RecordingTransport::default()
        });
        let flag = Arc::new(SuppressionFlag::with_state(true));
        let outcome = gate(&transport, &flag)
            .emit(1.0, 1.0, 1.0, ContextId::new("s"))
            .await
            .unwrap();
        assert_eq!(outcome, EmitOutcome::Suppressed);
    }
}
