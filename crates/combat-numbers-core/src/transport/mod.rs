//! The messaging substrate the relay runs on.
//!
//! A [`Transport`] connects one participant to every other participant. It
//! routes raw payload bytes by channel name and holds at most one handler
//! per channel for the local participant; subscribing again replaces the
//! previous handler.
//!
//! Two implementations exist: [`memory::MemoryTransport`] for in-process
//! participants (tests, local demos) and the NATS adapter in the node
//! binary.

pub mod memory;

use std::future::Future;
use std::sync::Arc;

use crate::error::TransportError;

/// Callback invoked with the raw bytes of every message on a channel.
///
/// Handlers run to completion before the transport invokes them again, so
/// a participant never processes two inbound messages at once.
pub type MessageHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// A bidirectional, channel-addressed message transport.
pub trait Transport: Send + Sync {
    /// Send `payload` to every other participant listening on `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the transport is unavailable or the
    /// publish fails.
    fn send(
        &self,
        channel: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Register `handler` as this participant's handler for `channel`.
    ///
    /// Completes once the registration is in effect.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the registration cannot be made.
    fn subscribe(
        &self,
        channel: &str,
        handler: MessageHandler,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Remove this participant's handler for `channel`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the transport is unavailable.
    fn unsubscribe(&self, channel: &str)
    -> impl Future<Output = Result<(), TransportError>> + Send;
}
