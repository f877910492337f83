//! Diagnostics collaborator for the signal bus.
//!
//! The bus never logs directly; it classifies conditions and reports them to
//! a [`SignalObserver`]. [`TracingObserver`] is the default implementation.

use std::fmt::Debug;

use tracing::{error, warn};

use crate::errors::SignalError;
use crate::signals::types::{BindingStyle, SignalKind};

/// Receives advisory and failure notifications from the bus.
///
/// Hooks are called synchronously at the point the condition is detected and
/// must not block.
pub trait SignalObserver: Send + Sync + Debug {
    /// A signal was declared a second time
    fn on_duplicate_declare(&self, kind: &SignalKind);

    /// A declared signal was emitted without any active-style subscribers
    fn on_no_subscribers(&self, kind: &SignalKind);

    /// A receiver was subscribed whose style differs from the binding's style
    fn on_style_mismatch(&self, _kind: &SignalKind, _expected: BindingStyle, _actual: BindingStyle) {}

    /// An emission failed because one or more subscribers failed
    fn on_dispatch_failure(&self, _error: &SignalError) {}
}

/// Observer that records conditions through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SignalObserver for TracingObserver {
    fn on_duplicate_declare(&self, kind: &SignalKind) {
        warn!(signal = kind.type_name(), "Signal '{}' has already been declared.", kind);
    }

    fn on_no_subscribers(&self, kind: &SignalKind) {
        warn!(signal = kind.type_name(), "No subscribers for signal '{}'.", kind);
    }

    fn on_style_mismatch(&self, kind: &SignalKind, expected: BindingStyle, actual: BindingStyle) {
        warn!(
            signal = kind.type_name(),
            %expected,
            %actual,
            "Receiver for signal '{}' will not be dispatched: binding uses {} style",
            kind,
            expected
        );
    }

    fn on_dispatch_failure(&self, error: &SignalError) {
        error!("{}", error);
    }
}
