//! Renderer interface for accepted combat numbers.

use combat_numbers_types::CombatNumber;

/// Consumer of accepted inbound numbers, typically a renderer.
///
/// Called synchronously from the inbound handler; implementations should
/// return quickly and must not fail.
pub trait EffectSink: Send + Sync {
    /// Show `number` at its coordinates.
    fn apply(&self, number: CombatNumber);
}

impl<F> EffectSink for F
where
    F: Fn(CombatNumber) + Send + Sync,
{
    fn apply(&self, number: CombatNumber) {
        self(number);
    }
}
