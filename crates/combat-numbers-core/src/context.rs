//! The local participant's currently viewed context.
//!
//! The relay never owns this value. It reads it through a
//! [`ContextProvider`] at delivery time, so relevance is decided by where
//! the participant is looking when a number *arrives*, not where it was
//! when the number was sent.

use combat_numbers_types::ContextId;
use tokio::sync::watch;

/// Source of the participant's current context.
pub trait ContextProvider: Send + Sync {
    /// The context being viewed right now, or `None` if nothing is viewed.
    fn current_context(&self) -> Option<ContextId>;
}

/// A live, shareable "currently viewed context" value.
///
/// Backed by a [`watch`] channel so readers never block writers and the
/// latest value is always what [`current`](Self::current) returns.
#[derive(Debug)]
pub struct ViewedContext {
    tx: watch::Sender<Option<ContextId>>,
}

impl ViewedContext {
    /// Create a value with no context viewed.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Create a value that starts out viewing `context`.
    pub fn viewing(context: ContextId) -> Self {
        let (tx, _rx) = watch::channel(Some(context));
        Self { tx }
    }

    /// Switch to viewing `context`. Returns the previously viewed context.
    pub fn view(&self, context: ContextId) -> Option<ContextId> {
        self.tx.send_replace(Some(context))
    }

    /// Stop viewing any context. Returns the previously viewed context.
    pub fn clear(&self) -> Option<ContextId> {
        self.tx.send_replace(None)
    }

    /// The context being viewed right now.
    pub fn current(&self) -> Option<ContextId> {
        self.tx.borrow().clone()
    }

    /// A receiver notified on every context change.
    pub fn changes(&self) -> watch::Receiver<Option<ContextId>> {
        self.tx.subscribe()
    }
}

impl Default for ViewedContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextProvider for ViewedContext {
    fn current_context(&self) -> Option<ContextId> {
        self.current()
    }
}
