//! Line-based operator console.
//!
//! Commands are read from stdin, one per line:
//!
//! | Command                 | Effect                                         |
//! |-------------------------|------------------------------------------------|
//! | `emit <number> <x> <y>` | Broadcast a number from the viewed context     |
//! | `view <context>`        | Switch the viewed context                      |
//! | `leave`                 | Stop viewing any context                       |
//! | `pause`                 | Suppress outbound broadcast                    |
//! | `resume`                | Lift suppression                               |
//! | `listen` / `mute`       | Activate / deactivate the listener             |
//! | `status`                | Log lifecycle state and counters               |
//! | `quit`                  | Shut down                                      |
//!
//! The loop also ends on end of input or Ctrl-C.

use combat_numbers_core::{CombatNumberRelay, SuppressionFlag, Transport, ViewedContext};
use combat_numbers_types::ContextId;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::{info, warn};

use crate::error::NodeError;

/// A parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Broadcast a number.
    Emit {
        /// Magnitude.
        number: f64,
        /// Horizontal position.
        x: f64,
        /// Vertical position.
        y: f64,
    },
    /// Switch the viewed context.
    View(ContextId),
    /// Stop viewing any context.
    Leave,
    /// Suppress outbound broadcast.
    Pause,
    /// Lift suppression.
    Resume,
    /// Activate the listener.
    Listen,
    /// Deactivate the listener.
    Mute,
    /// Report state and counters.
    Status,
    /// Shut down.
    Quit,
}

/// Errors from parsing a console line.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    /// The first word is not a known command.
    #[error("unknown command: {0}")]
    Unknown(String),

    /// A required argument was not given.
    #[error("missing argument <{0}>")]
    MissingArgument(&'static str),

    /// An argument did not parse as a number.
    #[error("<{name}> is not a number: {value}")]
    InvalidNumber {
        /// Argument name.
        name: &'static str,
        /// What was given.
        value: String,
    },
}

/// Parse one console line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb.to_lowercase().as_str() {
        "emit" => Command::Emit {
            number: number_arg(words.next(), "number")?,
            x: number_arg(words.next(), "x")?,
            y: number_arg(words.next(), "y")?,
        },
        "view" => {
            let context = words.next().ok_or(CommandError::MissingArgument("context"))?;
            Command::View(ContextId::new(context))
        }
        "leave" => Command::Leave,
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "listen" => Command::Listen,
        "mute" => Command::Mute,
        "status" => Command::Status,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_owned())),
    };
    Ok(Some(command))
}

fn number_arg(word: Option<&str>, name: &'static str) -> Result<f64, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument(name))?;
    word.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| CommandError::InvalidNumber {
            name,
            value: word.to_owned(),
        })
}

/// Everything a command can act on.
pub struct Session<'a, T> {
    /// The participant's relay.
    pub relay: &'a CombatNumberRelay<T>,
    /// The shared suppression flag.
    pub flag: &'a SuppressionFlag,
    /// The participant's viewed context.
    pub context: &'a ViewedContext,
}

impl<T: Transport> Session<'_, T> {
    /// Execute one command. Returns `false` when the session should end.
    ///
    /// Relay failures are logged rather than returned, so a transport
    /// hiccup does not end the session.
    pub async fn execute(&self, command: Command) -> bool {
        match command {
            Command::Emit { number, x, y } => {
                let Some(origin) = self.context.current() else {
                    warn!("not viewing a context, nothing to emit from");
                    return true;
                };
                match self.relay.emit(number, x, y, origin).await {
                    Ok(outcome) => info!(?outcome, number, x, y, "emit"),
                    Err(e) => warn!(error = %e, "emit failed"),
                }
            }
            Command::View(context) => {
                let previous = self.context.view(context.clone());
                info!(context = %context, previous = ?previous, "now viewing");
            }
            Command::Leave => {
                let previous = self.context.clear();
                info!(previous = ?previous, "no longer viewing a context");
            }
            Command::Pause => {
                self.flag.set_suppressed(true);
                info!("broadcast paused");
            }
            Command::Resume => {
                self.flag.set_suppressed(false);
                info!("broadcast resumed");
            }
            Command::Listen => {
                if let Err(e) = self.relay.activate().await {
                    warn!(error = %e, "activate failed");
                }
            }
            Command::Mute => {
                if let Err(e) = self.relay.deactivate().await {
                    warn!(error = %e, "deactivate failed");
                }
            }
            Command::Status => {
                let state = self.relay.state().await;
                let stats = serde_json::to_string(&self.relay.stats()).unwrap_or_default();
                info!(
                    channel = self.relay.channel(),
                    state = ?state,
                    suppressed = self.flag.is_suppressed(),
                    context = ?self.context.current(),
                    stats = %stats,
                    "status"
                );
            }
            Command::Quit => return false,
        }
        true
    }

    /// Read and execute commands until `quit`, end of input, or Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::Console`] if stdin cannot be read.
    pub async fn run(&self) -> Result<(), NodeError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupt received");
                    return Ok(());
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("console input closed");
                        return Ok(());
                    };
                    match parse_command(&line) {
                        Ok(Some(command)) => {
                            if !self.execute(command).await {
                                return Ok(());
                            }
                        }
                        Ok(None) => {}
                        Err(e) => warn!(error = %e, "invalid command"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use combat_numbers_core::transport::memory::MemoryHub;
    use combat_numbers_core::{BindingState, EffectSink};
    use combat_numbers_types::{COMBAT_NUMBERS_CHANNEL, CombatNumber};

    use super::*;

    #[test]
    fn parses_emit() {
        assert_eq!(
            parse_command("emit 7 100 200"),
            Ok(Some(Command::Emit {
                number: 7.0,
                x: 100.0,
                y: 200.0
            }))
        );
        assert_eq!(
            parse_command("  EMIT -3.5 0 0  "),
            Ok(Some(Command::Emit {
                number: -3.5,
                x: 0.0,
                y: 0.0
            }))
        );
    }

    #[test]
    fn emit_needs_three_finite_numbers() {
        assert_eq!(
            parse_command("emit 7 100"),
            Err(CommandError::MissingArgument("y"))
        );
        assert_eq!(
            parse_command("emit seven 1 2"),
            Err(CommandError::InvalidNumber {
                name: "number",
                value: "seven".to_owned()
            })
        );
        assert!(parse_command("emit NaN 1 2").is_err());
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(
            parse_command("view scene2"),
            Ok(Some(Command::View(ContextId::new("scene2"))))
        );
        assert_eq!(parse_command("view"), Err(CommandError::MissingArgument("context")));
        assert_eq!(parse_command("pause"), Ok(Some(Command::Pause)));
        assert_eq!(parse_command("resume"), Ok(Some(Command::Resume)));
        assert_eq!(parse_command("exit"), Ok(Some(Command::Quit)));
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(
            parse_command("dance"),
            Err(CommandError::Unknown("dance".to_owned()))
        );
    }

    #[tokio::test]
    async fn commands_drive_the_relay() {
        let hub = MemoryHub::new();
        let flag = Arc::new(SuppressionFlag::new());
        let context = Arc::new(ViewedContext::viewing(ContextId::new("scene1")));
        let ignore: Arc<dyn EffectSink> = Arc::new(|_: CombatNumber| {});
        let relay = CombatNumberRelay::new(
            COMBAT_NUMBERS_CHANNEL,
            Arc::new(hub.endpoint()),
            Arc::clone(&flag),
            Arc::clone(&context) as _,
            ignore,
        );
        let session = Session {
            relay: &relay,
            flag: &flag,
            context: &context,
        };

        assert!(session.execute(Command::Listen).await);
        assert_eq!(relay.state().await, BindingState::Active);

        assert!(session.execute(Command::Pause).await);
        assert!(flag.is_suppressed());
        assert!(
            session
                .execute(Command::Emit {
                    number: 1.0,
                    x: 2.0,
                    y: 3.0
                })
                .await
        );
        assert_eq!(relay.stats().suppressed, 1);
        assert_eq!(relay.stats().sent, 0);

        assert!(session.execute(Command::Leave).await);
        assert!(session.execute(Command::Resume).await);
        assert!(
            session
                .execute(Command::Emit {
                    number: 1.0,
                    x: 2.0,
                    y: 3.0
                })
                .await
        );
        assert_eq!(relay.stats().sent, 0);

        assert!(session.execute(Command::View(ContextId::new("scene4"))).await);
        assert_eq!(context.current(), Some(ContextId::new("scene4")));

        assert!(session.execute(Command::Mute).await);
        assert_eq!(relay.state().await, BindingState::Inactive);

        assert!(!session.execute(Command::Quit).await);
    }
}
