//! Delivery-side visibility filter.

use std::sync::Arc;

use combat_numbers_types::ContextId;

use crate::context::ContextProvider;

/// Decides whether an inbound number is relevant to this participant.
///
/// A number is relevant iff it originated in exactly the context the
/// participant is viewing at the moment of delivery. A participant that is
/// not viewing anything accepts nothing.
#[derive(Clone)]
pub struct DeliveryFilter {
    context: Arc<dyn ContextProvider>,
}

impl DeliveryFilter {
    /// Create a filter reading the live context from `context`.
    pub fn new(context: Arc<dyn ContextProvider>) -> Self {
        Self { context }
    }

    /// Whether a number from `origin` should be shown here.
    pub fn accept(&self, origin: &ContextId) -> bool {
        self.context
            .current_context()
            .is_some_and(|current| current == *origin)
    }
}

impl std::fmt::Debug for DeliveryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryFilter")
            .field("current", &self.context.current_context())
            .finish()
    }
}
