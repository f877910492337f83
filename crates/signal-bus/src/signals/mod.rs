/*!
Signal System

This module provides the type-keyed signal dispatcher. It includes:

- The registry mapping each declared signal type to its binding
- Priority-ordered bindings with sync, task and lightweight delivery
- Typed receiver handles used to subscribe and unsubscribe
- The observer contract used to report advisory conditions
*/

mod binding;
mod tiers;

pub mod builder;
pub mod observer;
pub mod receiver;
pub mod registry;
pub mod types;

pub use builder::SignalBusBuilder;
pub use observer::{SignalObserver, TracingObserver};
pub use receiver::{CallbackResult, Receiver, ReceiverId};
pub use registry::SignalBus;
pub use types::{BindingStyle, Priority, Signal, SignalKind};
