//! Shared type definitions for the combat numbers relay.
//!
//! This crate is the single source of truth for what travels on the wire
//! between participants. The payload type flows to `TypeScript` via `ts-rs`
//! so browser-side participants can share the same shape.
//!
//! # Modules
//!
//! - [`ids`] -- Context identifier newtype
//! - [`event`] -- The [`CombatNumberEvent`] wire payload, decoding, and
//!   numeric coercion

pub mod event;
pub mod ids;

pub use event::{CombatNumber, CombatNumberEvent, PayloadError};
pub use ids::ContextId;

/// Name of the channel every participant emits on and listens to.
pub const COMBAT_NUMBERS_CHANNEL: &str = "module.combat-numbers";
