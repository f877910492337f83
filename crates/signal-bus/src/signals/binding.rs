//! Per-signal subscriber container and dispatch.
//!
//! A [`Binding`] keeps one tier set per delivery style. Only the tier set
//! matching the style chosen at declaration is dispatched; receivers of other
//! styles are retained but never invoked.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::errors::{CallbackFailure, SignalError, SignalResult};
use crate::signals::receiver::{AsyncCallback, CallbackResult, Handler, Payload, ReceiverId, SyncCallback};
use crate::signals::tiers::Tiers;
use crate::signals::types::{BindingStyle, Priority, SignalKind};

/// Ordered multicast container owned by one declared signal
pub(crate) struct Binding {
    kind: SignalKind,
    style: BindingStyle,
    sync: RwLock<Tiers<SyncCallback>>,
    task: RwLock<Tiers<AsyncCallback>>,
    lightweight: RwLock<Tiers<AsyncCallback>>,
}

impl Binding {
    pub(crate) fn new(kind: SignalKind, style: BindingStyle) -> Self {
        Self {
            kind,
            style,
            sync: RwLock::new(Tiers::new()),
            task: RwLock::new(Tiers::new()),
            lightweight: RwLock::new(Tiers::new()),
        }
    }

    pub(crate) fn kind(&self) -> SignalKind {
        self.kind
    }

    pub(crate) fn style(&self) -> BindingStyle {
        self.style
    }

    /// Add a receiver's callback to the tier for `priority`.
    ///
    /// Returns `false` when the callback's style differs from the binding's
    /// style; the entry is stored but will not be dispatched.
    pub(crate) fn add(&self, handler: &Handler, id: ReceiverId, priority: Priority) -> bool {
        match handler {
            Handler::Sync(callback) => self.sync.write().insert(priority, id, callback.clone()),
            Handler::AsyncTask(callback) => self.task.write().insert(priority, id, callback.clone()),
            Handler::AsyncLightweight(callback) => {
                self.lightweight.write().insert(priority, id, callback.clone())
            }
        }
        trace!(signal = %self.kind, %id, priority, style = %handler.style(), "Added receiver");
        handler.style() == self.style
    }

    /// Remove the first entry for `id` at `priority` from the tiers of `style`
    pub(crate) fn remove(&self, style: BindingStyle, id: ReceiverId, priority: Priority) -> bool {
        let removed = match style {
            BindingStyle::Sync => self.sync.write().remove(priority, id),
            BindingStyle::AsyncTask => self.task.write().remove(priority, id),
            BindingStyle::AsyncLightweight => self.lightweight.write().remove(priority, id),
        };
        trace!(signal = %self.kind, %id, priority, removed, "Removed receiver");
        removed
    }

    /// Whether any receiver of the active style is registered
    pub(crate) fn has_subscribers(&self) -> bool {
        match self.style {
            BindingStyle::Sync => !self.sync.read().is_empty(),
            BindingStyle::AsyncTask => !self.task.read().is_empty(),
            BindingStyle::AsyncLightweight => !self.lightweight.read().is_empty(),
        }
    }

    /// Capture the receivers of the active style for one emission
    pub(crate) fn snapshot(&self) -> Snapshot {
        match self.style {
            BindingStyle::Sync => Snapshot::Sync(self.sync.read().snapshot()),
            BindingStyle::AsyncTask => Snapshot::Task(self.task.read().snapshot()),
            BindingStyle::AsyncLightweight => Snapshot::Lightweight(self.lightweight.read().snapshot()),
        }
    }

    /// Number of receivers of the active style
    pub(crate) fn subscriber_count(&self) -> usize {
        match self.style {
            BindingStyle::Sync => self.sync.read().len(),
            BindingStyle::AsyncTask => self.task.read().len(),
            BindingStyle::AsyncLightweight => self.lightweight.read().len(),
        }
    }

    /// Priorities with at least one receiver of the active style, highest first
    pub(crate) fn priorities(&self) -> Vec<Priority> {
        match self.style {
            BindingStyle::Sync => self.sync.read().priorities(),
            BindingStyle::AsyncTask => self.task.read().priorities(),
            BindingStyle::AsyncLightweight => self.lightweight.read().priorities(),
        }
    }

    /// Dispatch a snapshot taken from this binding
    pub(crate) async fn dispatch(&self, snapshot: Snapshot, payload: Payload) -> SignalResult<()> {
        match snapshot {
            Snapshot::Sync(callbacks) => self.invoke(callbacks, &*payload),
            Snapshot::Task(callbacks) => self.invoke_task(callbacks, payload).await,
            Snapshot::Lightweight(callbacks) => self.invoke_lightweight(callbacks, payload).await,
        }
    }

    /// Call every synchronous receiver in order on the current thread.
    ///
    /// The first failure stops the remaining invocations.
    pub(crate) fn invoke(&self, callbacks: Vec<SyncCallback>, payload: &(dyn Any + Send + Sync)) -> SignalResult<()> {
        debug!("Dispatching {} to {} sync receivers", self.kind, callbacks.len());

        for callback in callbacks {
            let failure = match panic::catch_unwind(AssertUnwindSafe(|| callback(payload))) {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => CallbackFailure::Failed(err),
                Err(panic_payload) => CallbackFailure::from_panic(panic_payload),
            };
            return Err(self.failure(vec![failure]));
        }
        Ok(())
    }

    /// Spawn every task receiver in order and wait for all of them to settle
    pub(crate) async fn invoke_task(&self, callbacks: Vec<AsyncCallback>, payload: Payload) -> SignalResult<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SignalError::RuntimeUnavailable(e.to_string()))?;

        debug!("Dispatching {} to {} task receivers", self.kind, callbacks.len());

        let mut failures = Vec::new();
        let mut units = Vec::with_capacity(callbacks.len());
        for callback in callbacks {
            match start_unit(&callback, &payload) {
                Ok(unit) => units.push(runtime.spawn(unit)),
                Err(failure) => failures.push(failure),
            }
        }

        for result in join_all(units).await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => failures.push(CallbackFailure::Failed(err)),
                Err(join_err) => failures.push(CallbackFailure::from_join_error(join_err)),
            }
        }
        self.settle(failures)
    }

    /// Poll every lightweight receiver concurrently on the emitting task
    pub(crate) async fn invoke_lightweight(&self, callbacks: Vec<AsyncCallback>, payload: Payload) -> SignalResult<()> {
        debug!("Dispatching {} to {} lightweight receivers", self.kind, callbacks.len());

        let mut failures = Vec::new();
        let mut units = Vec::with_capacity(callbacks.len());
        for callback in callbacks {
            match start_unit(&callback, &payload) {
                Ok(unit) => units.push(AssertUnwindSafe(unit).catch_unwind()),
                Err(failure) => failures.push(failure),
            }
        }

        for result in join_all(units).await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => failures.push(CallbackFailure::Failed(err)),
                Err(panic_payload) => failures.push(CallbackFailure::from_panic(panic_payload)),
            }
        }
        self.settle(failures)
    }

    fn settle(&self, failures: Vec<CallbackFailure>) -> SignalResult<()> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(self.failure(failures))
        }
    }

    fn failure(&self, failures: Vec<CallbackFailure>) -> SignalError {
        SignalError::DispatchFailure {
            signal: self.kind,
            failures,
        }
    }
}

/// Receivers of the active style, in dispatch order
pub(crate) enum Snapshot {
    Sync(Vec<SyncCallback>),
    Task(Vec<AsyncCallback>),
    Lightweight(Vec<AsyncCallback>),
}

impl Snapshot {
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Snapshot::Sync(callbacks) => callbacks.is_empty(),
            Snapshot::Task(callbacks) | Snapshot::Lightweight(callbacks) => callbacks.is_empty(),
        }
    }
}

/// Create one unit of work; a panic while building the future counts as a failure
fn start_unit(
    callback: &AsyncCallback,
    payload: &Payload,
) -> Result<BoxFuture<'static, CallbackResult>, CallbackFailure> {
    panic::catch_unwind(AssertUnwindSafe(|| callback(payload.clone())))
        .map_err(CallbackFailure::from_panic)
}
