//! Headless renderer.
//!
//! The node has no canvas, so "rendering" a combat number means writing it
//! to the log. Negative values are healing, positive values are damage.

use combat_numbers_core::EffectSink;
use combat_numbers_types::CombatNumber;
use tracing::info;

/// [`EffectSink`] that logs every accepted number.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRenderer;

impl LogRenderer {
    /// Create a new renderer.
    pub const fn new() -> Self {
        Self
    }
}

impl EffectSink for LogRenderer {
    fn apply(&self, number: CombatNumber) {
        let kind = if number.value < 0.0 { "heal" } else { "damage" };
        info!(
            value = number.value.abs(),
            x = number.x,
            y = number.y,
            kind,
            "combat number"
        );
    }
}
