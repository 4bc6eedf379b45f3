//! In-process transport.
//!
//! A [`MemoryHub`] plays the role of the server: every [`MemoryTransport`]
//! endpoint created from it can register one handler per channel, and a
//! send on one endpoint is delivered to every *other* endpoint listening on
//! that channel. The sender never hears its own messages, which matches how
//! socket broadcasts behave.
//!
//! Delivery is synchronous: handlers run on the sending task, one after the
//! other, after the routing table lock has been released. Each endpoint has
//! a delivery lock held for the duration of every handler call, so two
//! senders on different threads never run one receiver's handlers at once.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::trace;

use super::{MessageHandler, Transport};
use crate::error::TransportError;

/// A registered handler together with its endpoint's connection flag and
/// delivery lock.
struct Route {
    handler: MessageHandler,
    online: Arc<AtomicBool>,
    delivery: Arc<StdMutex<()>>,
}

/// Shared routing table connecting in-process endpoints.
#[derive(Default)]
pub struct MemoryHub {
    /// Channel name -> endpoint id -> route.
    routes: Mutex<BTreeMap<String, BTreeMap<u64, Route>>>,
    next_endpoint: AtomicU64,
}

impl MemoryHub {
    /// Create an empty hub.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a new, connected endpoint on this hub.
    pub fn endpoint(self: &Arc<Self>) -> MemoryTransport {
        let id = self.next_endpoint.fetch_add(1, Ordering::Relaxed);
        MemoryTransport {
            hub: Arc::clone(self),
            id,
            online: Arc::new(AtomicBool::new(true)),
            delivery: Arc::new(StdMutex::new(())),
            sent: AtomicU64::new(0),
        }
    }

    /// Number of endpoints with a handler registered on `channel`.
    pub async fn handler_count(&self, channel: &str) -> usize {
        self.routes.lock().await.get(channel).map_or(0, BTreeMap::len)
    }
}

impl std::fmt::Debug for MemoryHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHub")
            .field("next_endpoint", &self.next_endpoint.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// One participant's connection to a [`MemoryHub`].
pub struct MemoryTransport {
    hub: Arc<MemoryHub>,
    id: u64,
    online: Arc<AtomicBool>,
    /// Shared by every route of this endpoint; held while a handler runs.
    delivery: Arc<StdMutex<()>>,
    sent: AtomicU64,
}

impl MemoryTransport {
    /// Simulate losing the connection. Every operation fails with
    /// [`TransportError::Unavailable`] and nothing is delivered to this
    /// endpoint until [`reconnect`](Self::reconnect) is called.
    pub fn disconnect(&self) {
        self.online.store(false, Ordering::Release);
    }

    /// Restore a connection dropped by [`disconnect`](Self::disconnect).
    pub fn reconnect(&self) {
        self.online.store(true, Ordering::Release);
    }

    /// Whether the endpoint is currently connected.
    pub fn is_connected(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// Number of successful sends made through this endpoint.
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    /// Whether this endpoint has a handler registered on `channel`.
    pub async fn is_subscribed(&self, channel: &str) -> bool {
        self.hub
            .routes
            .lock()
            .await
            .get(channel)
            .is_some_and(|endpoints| endpoints.contains_key(&self.id))
    }

    fn ensure_connected(&self) -> Result<(), TransportError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(TransportError::Unavailable {
                message: format!("memory endpoint {} is disconnected", self.id),
            })
        }
    }
}

impl std::fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransport")
            .field("id", &self.id)
            .field("connected", &self.is_connected())
            .field("sent", &self.sent_count())
            .finish_non_exhaustive()
    }
}

impl Transport for MemoryTransport {
    async fn send(&self, channel: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        self.ensure_connected()?;

        let routes: Vec<(MessageHandler, Arc<StdMutex<()>>)> = {
            let table = self.hub.routes.lock().await;
            table
                .get(channel)
                .map(|endpoints| {
                    endpoints
                        .iter()
                        .filter(|(id, route)| **id != self.id && route.online.load(Ordering::Acquire))
                        .map(|(_, route)| (Arc::clone(&route.handler), Arc::clone(&route.delivery)))
                        .collect()
                })
                .unwrap_or_default()
        };

        self.sent.fetch_add(1, Ordering::Relaxed);
        trace!(
            endpoint = self.id,
            channel,
            recipients = routes.len(),
            "memory transport delivering"
        );

        for (handler, delivery) in routes {
            // A panicking handler leaves nothing behind the lock to repair.
            let _delivering = delivery.lock().unwrap_or_else(PoisonError::into_inner);
            handler(&payload);
        }
        Ok(())
    }

    async fn subscribe(&self, channel: &str, handler: MessageHandler) -> Result<(), TransportError> {
        self.ensure_connected()?;
        let route = Route {
            handler,
            online: Arc::clone(&self.online),
            delivery: Arc::clone(&self.delivery),
        };
        self.hub
            .routes
            .lock()
            .await
            .entry(channel.to_owned())
            .or_default()
            .insert(self.id, route);
        Ok(())
    }

    async fn unsubscribe(&self, channel: &str) -> Result<(), TransportError> {
        self.ensure_connected()?;
        let mut routes = self.hub.routes.lock().await;
        if let Some(endpoints) = routes.get_mut(channel) {
            endpoints.remove(&self.id);
            if endpoints.is_empty() {
                routes.remove(channel);
            }
        }
        Ok(())
    }
}
