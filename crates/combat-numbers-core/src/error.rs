//! Error types for the relay.
//!
//! Transport failures are surfaced exactly as the transport reported them;
//! [`RelayError`] forwards them transparently and only adds the one failure
//! the relay itself can produce (encoding an outbound payload).

use combat_numbers_types::PayloadError;

/// Errors reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// There is no live connection to send or register through.
    #[error("transport unavailable: {message}")]
    Unavailable {
        /// Description of why the transport is unavailable.
        message: String,
    },

    /// Registering or removing a channel handler failed.
    #[error("failed to subscribe to {channel}: {message}")]
    Subscribe {
        /// The channel being (un)subscribed.
        channel: String,
        /// Description of the failure.
        message: String,
    },

    /// Publishing a payload failed.
    #[error("failed to publish on {channel}: {message}")]
    Publish {
        /// The channel being published to.
        channel: String,
        /// Description of the failure.
        message: String,
    },
}

/// Errors returned by relay operations.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The transport failed; the error is passed through untouched.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The outbound payload could not be serialized.
    #[error("failed to encode combat number: {0}")]
    Encode(#[from] PayloadError),
}
