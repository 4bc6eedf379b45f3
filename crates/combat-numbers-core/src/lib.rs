//! Event relay and visibility-gated delivery for combat numbers.
//!
//! Every participant is both a sender and a receiver on one shared channel.
//! Outbound numbers go through a [`BroadcastGate`] that honours a shared
//! [`SuppressionFlag`]; inbound numbers arrive through the handler that a
//! [`ChannelBinding`] registers, are decoded once at the boundary, and are
//! passed to the [`EffectSink`] only if the [`DeliveryFilter`] finds that
//! the local participant is viewing the context the number came from.
//!
//! # Modules
//!
//! - [`binding`] -- Idempotent attach/detach of the channel handler.
//! - [`config`] -- Configuration loading from `combat-numbers.yaml`.
//! - [`context`] -- [`ContextProvider`] trait and the watch-backed
//!   [`ViewedContext`].
//! - [`error`] -- Transport and relay error types.
//! - [`filter`] -- The [`DeliveryFilter`] predicate.
//! - [`flag`] -- The [`SuppressionFlag`] store.
//! - [`gate`] -- The [`BroadcastGate`] for outbound numbers.
//! - [`relay`] -- [`CombatNumberRelay`], which wires all of the above.
//! - [`sink`] -- The [`EffectSink`] renderer interface.
//! - [`stats`] -- Delivery counters.
//! - [`transport`] -- The [`Transport`] trait and an in-memory hub.
//!
//! [`BroadcastGate`]: gate::BroadcastGate
//! [`SuppressionFlag`]: flag::SuppressionFlag
//! [`ChannelBinding`]: binding::ChannelBinding
//! [`EffectSink`]: sink::EffectSink
//! [`DeliveryFilter`]: filter::DeliveryFilter
//! [`ContextProvider`]: context::ContextProvider
//! [`ViewedContext`]: context::ViewedContext
//! [`CombatNumberRelay`]: relay::CombatNumberRelay
//! [`Transport`]: transport::Transport

pub mod binding;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod flag;
pub mod gate;
pub mod relay;
pub mod sink;
pub mod stats;
pub mod transport;

pub use binding::{BindingState, ChannelBinding};
pub use context::{ContextProvider, ViewedContext};
pub use error::{RelayError, TransportError};
pub use filter::DeliveryFilter;
pub use flag::SuppressionFlag;
pub use gate::{BroadcastGate, EmitOutcome};
pub use relay::{CombatNumberRelay, Delivery};
pub use sink::EffectSink;
pub use stats::{RelayStats, RelayStatsSnapshot};
pub use transport::{MessageHandler, Transport};
