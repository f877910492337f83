//! Configuration for the signal bus
//!
//! Supports defaults, JSON or TOML files, and environment variables.

use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::errors::{SignalError, SignalResult};
use crate::signals::types::{BindingStyle, Priority};

/// Environment variable overriding [`SignalBusConfig::default_style`]
pub const ENV_DEFAULT_STYLE: &str = "SIGNAL_BUS_DEFAULT_STYLE";

/// Environment variable overriding [`SignalBusConfig::default_priority`]
pub const ENV_DEFAULT_PRIORITY: &str = "SIGNAL_BUS_DEFAULT_PRIORITY";

/// Main configuration for a signal bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalBusConfig {
    /// Style used by `declare` when none is given
    pub default_style: BindingStyle,
    /// Priority used by `subscribe` and `unsubscribe` when none is given
    pub default_priority: Priority,
}

impl Default for SignalBusConfig {
    fn default() -> Self {
        Self {
            default_style: BindingStyle::Sync,
            default_priority: 0,
        }
    }
}

impl SignalBusConfig {
    /// Set the default binding style
    pub fn with_default_style(mut self, style: BindingStyle) -> Self {
        self.default_style = style;
        self
    }

    /// Set the default subscriber priority
    pub fn with_default_priority(mut self, priority: Priority) -> Self {
        self.default_priority = priority;
        self
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> SignalResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn from_file(path: impl AsRef<Path>) -> SignalResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SignalError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&contents),
            Some("toml") => Self::from_toml(&contents),
            _ => Err(SignalError::Config(format!(
                "Unsupported configuration format: {}",
                path.display()
            ))),
        }
    }

    /// Parse configuration from a JSON document
    pub fn from_json(contents: &str) -> SignalResult<Self> {
        serde_json::from_str(contents)
            .map_err(|e| SignalError::Config(format!("Invalid JSON configuration: {}", e)))
    }

    /// Parse configuration from a TOML document
    pub fn from_toml(contents: &str) -> SignalResult<Self> {
        toml::from_str(contents)
            .map_err(|e| SignalError::Config(format!("Invalid TOML configuration: {}", e)))
    }

    fn from_lookup<F>(lookup: F) -> SignalResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(style) = lookup(ENV_DEFAULT_STYLE) {
            config.default_style = style
                .parse()
                .map_err(|e| SignalError::Config(format!("{}: {}", ENV_DEFAULT_STYLE, e)))?;
        }

        if let Some(priority) = lookup(ENV_DEFAULT_PRIORITY) {
            config.default_priority = priority.trim().parse().map_err(|e| {
                SignalError::Config(format!("{}: invalid priority '{}': {}", ENV_DEFAULT_PRIORITY, priority, e))
            })?;
        }

        Ok(config)
    }
}
