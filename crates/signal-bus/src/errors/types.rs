use std::any::Any;
use thiserror::Error;

use crate::signals::types::{BindingStyle, SignalKind};

/// Result type alias using the signal bus error type
pub type SignalResult<T> = std::result::Result<T, SignalError>;

/// Errors raised by signal bus operations
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Signal '{0}' has already been declared.")]
    DuplicateDeclaration(SignalKind),

    #[error("Signal '{0}' has not been declared. Please declare it.")]
    NotDeclared(SignalKind),

    #[error("Error while firing signal '{signal}': {}", join_failures(.failures))]
    DispatchFailure {
        signal: SignalKind,
        failures: Vec<CallbackFailure>,
    },

    #[error("Signal '{signal}' is bound with {style} style and must be emitted asynchronously")]
    RequiresAsync {
        signal: SignalKind,
        style: BindingStyle,
    },

    #[error("No async runtime available: {0}")]
    RuntimeUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SignalError {
    /// The signal this error refers to, if any
    pub fn signal(&self) -> Option<&SignalKind> {
        match self {
            SignalError::DuplicateDeclaration(kind) | SignalError::NotDeclared(kind) => Some(kind),
            SignalError::DispatchFailure { signal, .. } | SignalError::RequiresAsync { signal, .. } => {
                Some(signal)
            }
            SignalError::RuntimeUnavailable(_) | SignalError::Config(_) => None,
        }
    }

    /// Callback failures carried by a dispatch failure, empty for other errors
    pub fn failures(&self) -> &[CallbackFailure] {
        match self {
            SignalError::DispatchFailure { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// A single subscriber failure observed while dispatching a signal
#[derive(Error, Debug)]
pub enum CallbackFailure {
    /// The callback returned an error
    #[error(transparent)]
    Failed(#[from] anyhow::Error),

    /// The callback panicked
    #[error("subscriber panicked: {0}")]
    Panicked(String),

    /// The spawned unit of work was cancelled before it settled
    #[error("subscriber task aborted: {0}")]
    Aborted(String),
}

impl CallbackFailure {
    /// Build a failure from a panic payload captured by `catch_unwind`
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "non-string panic payload".to_string()
        };
        CallbackFailure::Panicked(message)
    }

    /// Build a failure from a tokio join error
    pub(crate) fn from_join_error(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            Self::from_panic(err.into_panic())
        } else {
            CallbackFailure::Aborted(err.to_string())
        }
    }
}

fn join_failures(failures: &[CallbackFailure]) -> String {
    failures
        .iter()
        .map(|failure| failure.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
