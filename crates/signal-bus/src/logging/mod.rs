/*!
Logging

This module provides the logging setup used by applications embedding the
signal bus. The bus itself only emits `tracing` events; installing a
subscriber is left to the application.
*/

pub mod setup;

pub use setup::{log_startup, parse_log_level, setup_logging, LogFormat, LoggingConfig};
