//! Error types for the participant binary.
//!
//! [`NodeError`] wraps every failure mode during startup, the console loop,
//! and shutdown so `main` can propagate with `?`.

use combat_numbers_core::config::ConfigError;
use combat_numbers_core::{RelayError, TransportError};

/// Top-level error for the participant binary.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Connecting the transport failed.
    #[error("transport error: {source}")]
    Transport {
        /// The underlying transport error.
        #[from]
        source: TransportError,
    },

    /// Activating or deactivating the relay failed.
    #[error("relay error: {source}")]
    Relay {
        /// The underlying relay error.
        #[from]
        source: RelayError,
    },

    /// Reading console input failed.
    #[error("console error: {source}")]
    Console {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
