//! Combat numbers participant.
//!
//! Joins the combat numbers channel over NATS, logs every number emitted
//! from the context it is viewing, and lets an operator emit numbers,
//! switch context, and pause broadcast from the console.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `combat-numbers.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Connect to NATS
//! 4. Build the relay and start listening
//! 5. Run the console until `quit`, end of input, or Ctrl-C
//! 6. Stop listening and flush

mod console;
mod error;
mod nats;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use combat_numbers_core::config::RelayConfig;
use combat_numbers_core::{CombatNumberRelay, SuppressionFlag, ViewedContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::console::Session;
use crate::error::NodeError;
use crate::nats::NatsTransport;
use crate::render::LogRenderer;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "combat-numbers.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the NATS connection, or relay
/// activation fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("combat-numbers-node starting");
    match &config_path {
        Some(path) => info!(path = %path.display(), "configuration loaded"),
        None => info!("config file not found, using defaults"),
    }

    // 3. Connect to NATS.
    let transport = Arc::new(
        NatsTransport::connect(&config.transport.nats_url, config.transport.echo).await?,
    );

    // 4. Build the relay.
    let flag = Arc::new(SuppressionFlag::with_state(config.relay.start_suppressed));
    let context = Arc::new(
        config
            .participant
            .context
            .clone()
            .map_or_else(ViewedContext::new, ViewedContext::viewing),
    );
    let relay = CombatNumberRelay::new(
        config.relay.channel.clone(),
        Arc::clone(&transport),
        Arc::clone(&flag),
        Arc::clone(&context) as _,
        Arc::new(LogRenderer::new()),
    );
    relay.activate().await?;
    info!(
        channel = relay.channel(),
        suppressed = flag.is_suppressed(),
        context = ?context.current(),
        "relay ready"
    );

    // 5. Run the console.
    let session = Session {
        relay: &relay,
        flag: &flag,
        context: &context,
    };
    session.run().await?;

    // 6. Shut down.
    shutdown(&relay, &transport).await?;
    Ok(())
}

/// Stop listening and push out anything still buffered.
async fn shutdown(
    relay: &CombatNumberRelay<NatsTransport>,
    transport: &NatsTransport,
) -> Result<(), NodeError> {
    relay.deactivate().await?;
    transport.flush().await?;
    let stats = relay.stats();
    info!(
        sent = stats.sent,
        suppressed = stats.suppressed,
        delivered = stats.delivered,
        filtered = stats.filtered,
        malformed = stats.malformed,
        "combat-numbers-node shutdown complete"
    );
    Ok(())
}

/// Load configuration from `COMBAT_NUMBERS_CONFIG` or the default path.
///
/// A missing file is not an error; defaults (plus environment overrides)
/// are used instead. Returns the path actually loaded, if any.
fn load_config() -> Result<(RelayConfig, Option<PathBuf>), NodeError> {
    let path = std::env::var_os("COMBAT_NUMBERS_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = RelayConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        Ok((RelayConfig::parse("")?, None))
    }
}
