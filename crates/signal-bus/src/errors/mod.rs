/*!
Error Handling

This module provides the error types of the signal bus. It includes:

- The bus error taxonomy (declaration, lookup and dispatch failures)
- Per-callback failure records collected during fan-out
*/

pub mod types;

pub use types::{CallbackFailure, SignalError, SignalResult};
