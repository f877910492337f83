//! The signal registry.
//!
//! [`SignalBus`] maps each declared signal type to its binding and routes
//! emission to the invoke operation matching the style chosen at declaration.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::SignalBusConfig;
use crate::errors::{SignalError, SignalResult};
use crate::signals::binding::{Binding, Snapshot};
use crate::signals::builder::SignalBusBuilder;
use crate::signals::observer::{SignalObserver, TracingObserver};
use crate::signals::receiver::{Payload, Receiver};
use crate::signals::types::{BindingStyle, Priority, Signal, SignalKind};

/// Type-keyed publish/subscribe dispatcher.
///
/// Cloning a `SignalBus` yields another handle to the same registry; construct
/// one at startup and pass clones to the components that need it.
///
/// ```rust
/// use signal_bus::{Receiver, SignalBus};
///
/// struct LevelCompleted(u32);
///
/// # fn main() -> Result<(), signal_bus::SignalError> {
/// let bus = SignalBus::new();
/// bus.declare::<LevelCompleted>()?;
///
/// let on_complete = Receiver::sync(|event: &LevelCompleted| println!("level {} done", event.0));
/// bus.subscribe(&on_complete)?;
/// bus.fire(&LevelCompleted(3))?;
/// bus.unsubscribe(&on_complete)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SignalBus {
    inner: Arc<Inner>,
}

struct Inner {
    bindings: DashMap<SignalKind, Arc<Binding>>,
    config: SignalBusConfig,
    observer: Arc<dyn SignalObserver>,
}

impl SignalBus {
    /// Create a bus with default configuration and the tracing observer
    pub fn new() -> Self {
        Self::with_config(SignalBusConfig::default())
    }

    /// Create a bus with the given configuration and the tracing observer
    pub fn with_config(config: SignalBusConfig) -> Self {
        Self::from_parts(config, Arc::new(TracingObserver))
    }

    /// Start building a bus
    pub fn builder() -> SignalBusBuilder {
        SignalBusBuilder::new()
    }

    pub(crate) fn from_parts(config: SignalBusConfig, observer: Arc<dyn SignalObserver>) -> Self {
        debug!("Created SignalBus with config: {:?}", config);
        Self {
            inner: Arc::new(Inner {
                bindings: DashMap::new(),
                config,
                observer,
            }),
        }
    }

    /// Configuration this bus was built with
    pub fn config(&self) -> &SignalBusConfig {
        &self.inner.config
    }

    /// Declare `S` with the configured default style
    pub fn declare<S: Signal>(&self) -> SignalResult<()> {
        self.declare_with_style::<S>(self.inner.config.default_style)
    }

    /// Declare `S` with an explicit delivery style.
    ///
    /// Fails with [`SignalError::DuplicateDeclaration`] if `S` is already
    /// declared; the existing binding is left untouched.
    pub fn declare_with_style<S: Signal>(&self, style: BindingStyle) -> SignalResult<()> {
        let kind = SignalKind::of::<S>();
        let duplicate = match self.inner.bindings.entry(kind) {
            Entry::Occupied(_) => true,
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(Binding::new(kind, style)));
                false
            }
        };

        // The shard lock is released here, so the observer may call back into the bus
        if duplicate {
            self.inner.observer.on_duplicate_declare(&kind);
            return Err(SignalError::DuplicateDeclaration(kind));
        }
        debug!(signal = kind.type_name(), %style, "Declared signal {}", kind);
        Ok(())
    }

    /// Subscribe `receiver` at the configured default priority
    pub fn subscribe<S: Signal>(&self, receiver: &Receiver<S>) -> SignalResult<()> {
        self.subscribe_with_priority(receiver, self.inner.config.default_priority)
    }

    /// Subscribe `receiver` at `priority`. Higher priorities run first.
    pub fn subscribe_with_priority<S: Signal>(&self, receiver: &Receiver<S>, priority: Priority) -> SignalResult<()> {
        let binding = self.binding::<S>()?;
        if !binding.add(receiver.handler(), receiver.id(), priority) {
            self.inner
                .observer
                .on_style_mismatch(&binding.kind(), binding.style(), receiver.style());
        }
        Ok(())
    }

    /// Unsubscribe `receiver` from the configured default priority
    pub fn unsubscribe<S: Signal>(&self, receiver: &Receiver<S>) -> SignalResult<bool> {
        self.unsubscribe_with_priority(receiver, self.inner.config.default_priority)
    }

    /// Remove the first registration of `receiver` at `priority`.
    ///
    /// Returns `Ok(false)` when the receiver was not registered there.
    pub fn unsubscribe_with_priority<S: Signal>(&self, receiver: &Receiver<S>, priority: Priority) -> SignalResult<bool> {
        let binding = self.binding::<S>()?;
        Ok(binding.remove(receiver.style(), receiver.id(), priority))
    }

    /// Emit `signal` and wait until every subscriber has run.
    ///
    /// Sync bindings invoke subscribers in order before this future resolves;
    /// async bindings start every subscriber in priority order and resolve once
    /// all of them have settled.
    pub async fn emit<S: Signal>(&self, signal: S) -> SignalResult<()> {
        let Some((binding, snapshot)) = self.ready_binding::<S>()? else {
            return Ok(());
        };

        let payload: Payload = Arc::new(signal);
        let result = binding.dispatch(snapshot, payload).await;
        self.report(result)
    }

    /// Emit `signal` on a `Sync` binding without an async context.
    ///
    /// Fails with [`SignalError::RequiresAsync`] for async bindings.
    pub fn fire<S: Signal>(&self, signal: &S) -> SignalResult<()> {
        let binding = self.binding::<S>()?;
        let Snapshot::Sync(callbacks) = binding.snapshot() else {
            return Err(SignalError::RequiresAsync {
                signal: binding.kind(),
                style: binding.style(),
            });
        };
        if callbacks.is_empty() {
            self.inner.observer.on_no_subscribers(&binding.kind());
            return Ok(());
        }

        let result = binding.invoke(callbacks, signal);
        self.report(result)
    }

    /// Emit `signal` on a spawned tokio task and return its handle.
    ///
    /// Declaration and subscriber checks happen before spawning; dispatch
    /// failures are delivered through the handle.
    pub fn emit_detached<S: Signal>(&self, signal: S) -> SignalResult<JoinHandle<SignalResult<()>>> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SignalError::RuntimeUnavailable(e.to_string()))?;

        let ready = self.ready_binding::<S>()?;
        let bus = self.clone();
        Ok(runtime.spawn(async move {
            let Some((binding, snapshot)) = ready else {
                return Ok(());
            };
            let payload: Payload = Arc::new(signal);
            let result = binding.dispatch(snapshot, payload).await;
            bus.report(result)
        }))
    }

    /// Whether `S` has been declared
    pub fn is_declared<S: Signal>(&self) -> bool {
        self.inner.bindings.contains_key(&SignalKind::of::<S>())
    }

    /// Style `S` was declared with
    pub fn style_of<S: Signal>(&self) -> Option<BindingStyle> {
        self.inner
            .bindings
            .get(&SignalKind::of::<S>())
            .map(|entry| entry.value().style())
    }

    /// Whether `S` has at least one subscriber that participates in dispatch
    pub fn has_subscribers<S: Signal>(&self) -> SignalResult<bool> {
        Ok(self.binding::<S>()?.has_subscribers())
    }

    /// Number of subscribers of `S` that participate in dispatch
    pub fn subscriber_count<S: Signal>(&self) -> SignalResult<usize> {
        Ok(self.binding::<S>()?.subscriber_count())
    }

    /// Priorities that currently have dispatchable subscribers of `S`, highest first
    pub fn priorities<S: Signal>(&self) -> SignalResult<Vec<Priority>> {
        Ok(self.binding::<S>()?.priorities())
    }

    /// Number of declared signals
    pub fn len(&self) -> usize {
        self.inner.bindings.len()
    }

    /// Whether no signal has been declared
    pub fn is_empty(&self) -> bool {
        self.inner.bindings.is_empty()
    }

    /// Look up the binding for `S`. The map guard is released before returning.
    fn binding<S: Signal>(&self) -> SignalResult<Arc<Binding>> {
        let kind = SignalKind::of::<S>();
        self.inner
            .bindings
            .get(&kind)
            .map(|entry| entry.value().clone())
            .ok_or(SignalError::NotDeclared(kind))
    }

    /// Binding for `S` with the receivers captured for this emission; reports
    /// the no-subscriber advisory when the capture is empty
    fn ready_binding<S: Signal>(&self) -> SignalResult<Option<(Arc<Binding>, Snapshot)>> {
        let binding = self.binding::<S>()?;
        let snapshot = binding.snapshot();
        if snapshot.is_empty() {
            self.inner.observer.on_no_subscribers(&binding.kind());
            return Ok(None);
        }
        Ok(Some((binding, snapshot)))
    }

    fn report(&self, result: SignalResult<()>) -> SignalResult<()> {
        if let Err(err) = &result {
            self.inner.observer.on_dispatch_failure(err);
        }
        result
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalBus")
            .field("declared", &self.len())
            .field("config", &self.inner.config)
            .field("observer", &self.inner.observer)
            .finish()
    }
}
