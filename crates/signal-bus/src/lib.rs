//! # signal-bus
//!
//! An in-process, type-keyed publish/subscribe dispatcher.
//!
//! Producers declare a signal type once, consumers subscribe [`Receiver`]s
//! against it with a numeric priority, and producers emit signal values that
//! are delivered to every receiver in descending priority order.
//!
//! Each declared signal has one delivery style:
//!
//! - [`BindingStyle::Sync`]: receivers run in order on the emitting thread
//! - [`BindingStyle::AsyncTask`]: receivers are spawned as tokio tasks and awaited together
//! - [`BindingStyle::AsyncLightweight`]: receivers are polled together on the emitting task
//!
//! ```rust
//! use std::sync::Arc;
//! use signal_bus::{BindingStyle, Receiver, SignalBus};
//!
//! struct OrderPlaced { id: u64 }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), signal_bus::SignalError> {
//! let bus = SignalBus::new();
//! bus.declare_with_style::<OrderPlaced>(BindingStyle::AsyncLightweight)?;
//!
//! let audit = Receiver::lightweight(|order: Arc<OrderPlaced>| async move {
//!     println!("audit order {}", order.id);
//!     Ok(())
//! });
//! bus.subscribe_with_priority(&audit, 10)?;
//!
//! bus.emit(OrderPlaced { id: 7 }).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod logging;
pub mod signals;

pub use config::SignalBusConfig;
pub use errors::{CallbackFailure, SignalError, SignalResult};
pub use signals::{
    BindingStyle, CallbackResult, Priority, Receiver, ReceiverId, Signal, SignalBus, SignalBusBuilder,
    SignalKind, SignalObserver, TracingObserver,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::{SignalError, SignalResult};
    pub use crate::signals::{BindingStyle, Receiver, SignalBus, SignalObserver};
}
