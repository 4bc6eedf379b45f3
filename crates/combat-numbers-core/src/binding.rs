//! Attach/detach lifecycle of the channel handler.
//!
//! ```text
//! Inactive --activate()--> Active --deactivate()--> Inactive
//! ```
//!
//! The binding remembers which state it is in, so both transitions are
//! idempotent: activating an active binding and deactivating an inactive
//! one are no-ops that never reach the transport. This keeps a participant
//! to exactly one registered handler regardless of how the underlying
//! transport treats repeated registrations.
//!
//! A failed transition leaves the state unchanged, and the transport's
//! error is returned as-is.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::transport::{MessageHandler, Transport};

/// Whether the binding's handler is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingState {
    /// No handler registered; inbound events cannot arrive.
    #[default]
    Inactive,
    /// Handler registered; inbound events are processed.
    Active,
}

/// Owns the registration of one handler on one channel.
pub struct ChannelBinding<T> {
    transport: Arc<T>,
    channel: String,
    handler: MessageHandler,
    /// Held across the transport call so concurrent transitions serialize.
    state: Mutex<BindingState>,
}

impl<T: Transport> ChannelBinding<T> {
    /// Create an inactive binding that will register `handler` on `channel`.
    pub fn new(transport: Arc<T>, channel: impl Into<String>, handler: MessageHandler) -> Self {
        Self {
            transport,
            channel: channel.into(),
            handler,
            state: Mutex::new(BindingState::Inactive),
        }
    }

    /// Register the handler. No-op if already active.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if registration fails; the binding
    /// stays inactive.
    pub async fn activate(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        if *state == BindingState::Active {
            debug!(channel = %self.channel, "binding already active");
            return Ok(());
        }

        self.transport
            .subscribe(&self.channel, Arc::clone(&self.handler))
            .await?;
        *state = BindingState::Active;
        info!(channel = %self.channel, "listening for combat numbers");
        Ok(())
    }

    /// Remove the handler. No-op if already inactive.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if removal fails; the binding stays
    /// active.
    pub async fn deactivate(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        if *state == BindingState::Inactive {
            debug!(channel = %self.channel, "binding already inactive");
            return Ok(());
        }

        self.transport.unsubscribe(&self.channel).await?;
        *state = BindingState::Inactive;
        info!(channel = %self.channel, "stopped listening for combat numbers");
        Ok(())
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> BindingState {
        *self.state.lock().await
    }

    /// The channel this binding registers on.
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl<T> std::fmt::Debug for ChannelBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelBinding")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
