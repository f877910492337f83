use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::SignalBusConfig;
use crate::errors::{SignalError, SignalResult};

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per event on stdout
    Json,
}

/// Subscriber settings for a process embedding the bus.
///
/// `level` is the base directive; anything in `RUST_LOG` is layered on top,
/// so `RUST_LOG=signal_bus=debug` turns on dispatch tracing only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Include file and line of the emitting call site
    pub source_locations: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            source_locations: false,
        }
    }
}

impl LoggingConfig {
    pub fn for_level(level: Level) -> Self {
        Self {
            level: level.to_string().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    pub fn with_source_locations(mut self) -> Self {
        self.source_locations = true;
        self
    }
}

/// Install a global `tracing` subscriber built from `config`.
///
/// Fails on an unknown level or if a global subscriber is already installed.
pub fn setup_logging(config: &LoggingConfig) -> SignalResult<()> {
    let level = parse_log_level(&config.level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_file(config.source_locations)
        .with_line_number(config.source_locations);

    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.with_writer(std::io::stdout).json().try_init(),
    };
    installed.map_err(|e| SignalError::Config(format!("Failed to install log subscriber: {}", e)))
}

/// Parse a log level name, ignoring case and surrounding whitespace
pub fn parse_log_level(level: &str) -> SignalResult<Level> {
    Level::from_str(level.trim())
        .map_err(|_| SignalError::Config(format!("Invalid log level: {}", level)))
}

/// Log the crate version and the defaults a bus will be built with
pub fn log_startup(config: &SignalBusConfig) {
    tracing::info!(
        default_style = %config.default_style,
        default_priority = config.default_priority,
        "Starting signal-bus v{}",
        env!("CARGO_PKG_VERSION")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level(" WARN ").unwrap(), Level::WARN);
        assert!(matches!(parse_log_level("loud"), Err(SignalError::Config(_))));
    }

    #[test]
    fn test_for_level_round_trips_through_parse() {
        let config = LoggingConfig::for_level(Level::TRACE).json().with_source_locations();
        assert_eq!(parse_log_level(&config.level).unwrap(), Level::TRACE);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.source_locations);
    }

    #[test]
    fn test_config_from_toml() {
        let config: LoggingConfig = toml::from_str("format = \"json\"\n").unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_setup_logging() {
        let bad = LoggingConfig {
            level: "chatty".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(setup_logging(&bad), Err(SignalError::Config(_))));

        setup_logging(&LoggingConfig::for_level(Level::WARN)).unwrap();
        log_startup(&SignalBusConfig::default());
        assert!(setup_logging(&LoggingConfig::default()).is_err());
    }
}
