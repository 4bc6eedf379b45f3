//! Configuration loading and typed config structures.
//!
//! Configuration lives in `combat-numbers.yaml`. Every field has a default,
//! so an empty file (or no file at all) yields a working local setup.
//!
//! ```yaml
//! relay:
//!   channel: "module.combat-numbers"
//!   start_suppressed: false
//! participant:
//!   context: "scene1"
//! transport:
//!   nats_url: "nats://localhost:4222"
//!   echo: false
//! logging:
//!   level: "info"
//! ```

use std::path::Path;

use combat_numbers_types::{COMBAT_NUMBERS_CHANNEL, ContextId};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level relay configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RelayConfig {
    /// Channel and broadcast settings.
    #[serde(default)]
    pub relay: RelaySection,

    /// Local participant settings.
    #[serde(default)]
    pub participant: ParticipantConfig,

    /// Transport connection settings.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RelayConfig {
    /// Load configuration from a YAML file.
    ///
    /// `NATS_URL` in the environment overrides `transport.nats_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping.
        if yaml.trim().is_empty() {
            let mut config = Self::default();
            config.transport.apply_env_overrides();
            return Ok(config);
        }
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.transport.apply_env_overrides();
        Ok(config)
    }
}

/// Channel and broadcast settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelaySection {
    /// Channel name shared by every participant.
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Whether broadcast starts out suppressed.
    #[serde(default)]
    pub start_suppressed: bool,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            start_suppressed: false,
        }
    }
}

/// Local participant settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParticipantConfig {
    /// Context viewed at startup. `None` means nothing is viewed.
    #[serde(default)]
    pub context: Option<ContextId>,
}

/// Transport connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransportConfig {
    /// NATS server URL.
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Whether a participant receives its own broadcasts.
    #[serde(default)]
    pub echo: bool,
}

impl TransportConfig {
    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NATS_URL") {
            self.nats_url = val;
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            nats_url: default_nats_url(),
            echo: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_channel() -> String {
    COMBAT_NUMBERS_CHANNEL.to_owned()
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RelayConfig::default();
        assert_eq!(config.relay.channel, COMBAT_NUMBERS_CHANNEL);
        assert!(!config.relay.start_suppressed);
        assert_eq!(config.participant.context, None);
        assert!(!config.transport.echo);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
relay:
  channel: "test.numbers"
  start_suppressed: true
participant:
  context: "scene7"
transport:
  nats_url: "nats://testhost:4222"
  echo: true
logging:
  level: "debug"
"#;
        let config = RelayConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.relay.channel, "test.numbers");
        assert!(config.relay.start_suppressed);
        assert_eq!(config.participant.context, Some(ContextId::new("scene7")));
        assert!(config.transport.echo);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = RelayConfig::parse("relay:\n  start_suppressed: true\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert!(config.relay.start_suppressed);
        assert_eq!(config.relay.channel, COMBAT_NUMBERS_CHANNEL);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(RelayConfig::parse("").is_ok());
    }

    #[test]
    fn parse_invalid_yaml() {
        let result = RelayConfig::parse("relay: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = RelayConfig::from_file(Path::new("/nonexistent/combat-numbers.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
