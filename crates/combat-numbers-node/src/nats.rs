//! NATS-backed [`Transport`].
//!
//! Channel names are used directly as NATS subjects, so the default
//! channel `module.combat-numbers` is the subject every participant
//! publishes to and subscribes on.
//!
//! Each subscribed channel gets one listener task that owns the NATS
//! [`Subscriber`](async_nats::Subscriber) and invokes the handler for each
//! message in turn. Unsubscribing signals the task, which unsubscribes
//! from the server and exits; [`Transport::unsubscribe`] returns only after
//! the task has finished, so no handler call can happen afterwards.
//!
//! By default the connection is opened with `no_echo`, so a participant
//! never hears its own broadcasts.

use std::collections::BTreeMap;

use combat_numbers_core::{MessageHandler, Transport, TransportError};
use futures::StreamExt as _;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A running subscription on one channel.
struct Listener {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// NATS client wrapper implementing the relay transport.
pub struct NatsTransport {
    client: async_nats::Client,
    listeners: Mutex<BTreeMap<String, Listener>>,
}

impl NatsTransport {
    /// Connect to a NATS server.
    ///
    /// With `echo` disabled the server will not deliver this connection's
    /// own publishes back to it.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Unavailable`] if the connection cannot be
    /// established.
    pub async fn connect(url: &str, echo: bool) -> Result<Self, TransportError> {
        info!(url, echo, "connecting to NATS server");
        let mut options = async_nats::ConnectOptions::new();
        if !echo {
            options = options.no_echo();
        }
        let client = options
            .connect(url)
            .await
            .map_err(|e| TransportError::Unavailable {
                message: format!("failed to connect to {url}: {e}"),
            })?;
        info!("NATS connection established");
        Ok(Self::from_client(client))
    }

    /// Wrap an already-connected client.
    pub fn from_client(client: async_nats::Client) -> Self {
        Self {
            client,
            listeners: Mutex::new(BTreeMap::new()),
        }
    }

    /// Flush all pending publishes to the server.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Unavailable`] if the flush fails.
    pub async fn flush(&self) -> Result<(), TransportError> {
        self.client
            .flush()
            .await
            .map_err(|e| TransportError::Unavailable {
                message: format!("flush failed: {e}"),
            })
    }

    /// Stop a listener and wait for its task to exit.
    async fn stop_listener(channel: &str, listener: Listener) -> Result<(), TransportError> {
        // The task may already have exited if the server closed the subscription.
        let _ = listener.shutdown.send(());
        listener.task.await.map_err(|e| TransportError::Subscribe {
            channel: channel.to_owned(),
            message: format!("listener task failed: {e}"),
        })
    }
}

impl std::fmt::Debug for NatsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsTransport")
            .field("connected", &true)
            .finish_non_exhaustive()
    }
}

impl Transport for NatsTransport {
    async fn send(&self, channel: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        debug!(subject = channel, bytes = payload.len(), "publishing");
        self.client
            .publish(channel.to_owned(), payload.into())
            .await
            .map_err(|e| TransportError::Publish {
                channel: channel.to_owned(),
                message: e.to_string(),
            })
    }

    async fn subscribe(&self, channel: &str, handler: MessageHandler) -> Result<(), TransportError> {
        let mut listeners = self.listeners.lock().await;
        if let Some(previous) = listeners.remove(channel) {
            debug!(subject = channel, "replacing existing listener");
            Self::stop_listener(channel, previous).await?;
        }

        let mut subscriber = self
            .client
            .subscribe(channel.to_owned())
            .await
            .map_err(|e| TransportError::Subscribe {
                channel: channel.to_owned(),
                message: e.to_string(),
            })?;

        let (shutdown, mut shutdown_rx) = oneshot::channel();
        let subject = channel.to_owned();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        if let Err(e) = subscriber.unsubscribe().await {
                            warn!(subject = %subject, error = %e, "failed to unsubscribe");
                        }
                        break;
                    }
                    message = subscriber.next() => {
                        let Some(message) = message else {
                            warn!(subject = %subject, "subscription closed by server");
                            break;
                        };
                        handler(&message.payload);
                    }
                }
            }
            debug!(subject = %subject, "listener stopped");
        });

        listeners.insert(channel.to_owned(), Listener { shutdown, task });
        info!(subject = channel, "subscribed");
        Ok(())
    }

    async fn unsubscribe(&self, channel: &str) -> Result<(), TransportError> {
        let listener = self.listeners.lock().await.remove(channel);
        if let Some(listener) = listener {
            Self::stop_listener(channel, listener).await?;
            info!(subject = channel, "unsubscribed");
        }
        Ok(())
    }
}
