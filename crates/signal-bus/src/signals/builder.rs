use std::sync::Arc;

use crate::config::SignalBusConfig;
use crate::signals::observer::{SignalObserver, TracingObserver};
use crate::signals::registry::SignalBus;
use crate::signals::types::{BindingStyle, Priority};

/// Builder for configuring and creating a [`SignalBus`]
///
/// # Examples
///
/// ```rust
/// use signal_bus::{BindingStyle, SignalBus};
///
/// let bus = SignalBus::builder()
///     .default_style(BindingStyle::AsyncLightweight)
///     .default_priority(10)
///     .build();
///
/// assert_eq!(bus.config().default_priority, 10);
/// ```
#[derive(Debug, Clone)]
pub struct SignalBusBuilder {
    config: SignalBusConfig,
    observer: Option<Arc<dyn SignalObserver>>,
}

impl SignalBusBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: SignalBusConfig::default(),
            observer: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: SignalBusConfig) -> Self {
        self.config = config;
        self
    }

    /// Style used by `declare`
    pub fn default_style(mut self, style: BindingStyle) -> Self {
        self.config.default_style = style;
        self
    }

    /// Priority used by `subscribe` and `unsubscribe`
    pub fn default_priority(mut self, priority: Priority) -> Self {
        self.config.default_priority = priority;
        self
    }

    /// Observer notified of advisory conditions and dispatch failures
    pub fn observer(mut self, observer: Arc<dyn SignalObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the bus
    pub fn build(self) -> SignalBus {
        let observer = self.observer.unwrap_or_else(|| Arc::new(TracingObserver));
        SignalBus::from_parts(self.config, observer)
    }
}

impl Default for SignalBusBuilder {
    fn default() -> Self {
        Self::new()
    }
}
