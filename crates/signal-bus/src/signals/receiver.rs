//! Caller-held subscriber handles.
//!
//! A [`Receiver`] wraps a typed closure into the type-erased callback stored
//! by a binding. The payload type is recovered here, never inside the binding.

use std::any::Any;
use std::fmt::{self, Debug};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::signals::types::{BindingStyle, Signal, SignalKind};

/// Result returned by subscriber callbacks
pub type CallbackResult = anyhow::Result<()>;

/// Type-erased payload shared with asynchronous subscribers
pub(crate) type Payload = Arc<dyn Any + Send + Sync>;

/// Type-erased synchronous callback
pub(crate) type SyncCallback = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> CallbackResult + Send + Sync>;

/// Type-erased asynchronous callback producing one unit of work per call
pub(crate) type AsyncCallback = Arc<dyn Fn(Payload) -> BoxFuture<'static, CallbackResult> + Send + Sync>;

static NEXT_RECEIVER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a receiver, shared by all of its clones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReceiverId(u64);

impl ReceiverId {
    fn next() -> Self {
        ReceiverId(NEXT_RECEIVER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ReceiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "receiver-{}", self.0)
    }
}

/// Erased callback tagged with its delivery style
#[derive(Clone)]
pub(crate) enum Handler {
    Sync(SyncCallback),
    AsyncTask(AsyncCallback),
    AsyncLightweight(AsyncCallback),
}

impl Handler {
    pub(crate) fn style(&self) -> BindingStyle {
        match self {
            Handler::Sync(_) => BindingStyle::Sync,
            Handler::AsyncTask(_) => BindingStyle::AsyncTask,
            Handler::AsyncLightweight(_) => BindingStyle::AsyncLightweight,
        }
    }
}

/// A subscriber callback for signals of type `S`.
///
/// Cloning a receiver keeps its identity, so a clone can be used to
/// unsubscribe the original.
///
/// ```rust
/// use signal_bus::Receiver;
///
/// struct Tick(u64);
///
/// let on_tick = Receiver::sync(|tick: &Tick| println!("tick {}", tick.0));
/// let same = on_tick.clone();
/// assert_eq!(on_tick.id(), same.id());
/// ```
pub struct Receiver<S: Signal> {
    id: ReceiverId,
    handler: Handler,
    _signal: PhantomData<fn(S)>,
}

impl<S: Signal> Receiver<S> {
    /// Infallible synchronous receiver
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        Self::try_sync(move |signal: &S| {
            f(signal);
            Ok(())
        })
    }

    /// Synchronous receiver that may fail
    pub fn try_sync<F>(f: F) -> Self
    where
        F: Fn(&S) -> CallbackResult + Send + Sync + 'static,
    {
        let callback: SyncCallback = Arc::new(move |payload: &(dyn Any + Send + Sync)| {
            match payload.downcast_ref::<S>() {
                Some(signal) => f(signal),
                None => Err(payload_mismatch::<S>()),
            }
        });
        Self::from_handler(Handler::Sync(callback))
    }

    /// Asynchronous receiver whose futures are spawned as tokio tasks
    pub fn task<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        Self::from_handler(Handler::AsyncTask(erase_async(f)))
    }

    /// Asynchronous receiver whose futures are polled on the emitting task
    pub fn lightweight<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        Self::from_handler(Handler::AsyncLightweight(erase_async(f)))
    }

    fn from_handler(handler: Handler) -> Self {
        Self {
            id: ReceiverId::next(),
            handler,
            _signal: PhantomData,
        }
    }

    /// Identity used for unsubscription
    pub fn id(&self) -> ReceiverId {
        self.id
    }

    /// Delivery style this receiver participates in
    pub fn style(&self) -> BindingStyle {
        self.handler.style()
    }

    pub(crate) fn handler(&self) -> &Handler {
        &self.handler
    }
}

impl<S: Signal> Clone for Receiver<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: self.handler.clone(),
            _signal: PhantomData,
        }
    }
}

impl<S: Signal> PartialEq for Receiver<S> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S: Signal> Eq for Receiver<S> {}

impl<S: Signal> Debug for Receiver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("id", &self.id)
            .field("signal", &SignalKind::of::<S>())
            .field("style", &self.style())
            .finish()
    }
}

fn erase_async<S, F, Fut>(f: F) -> AsyncCallback
where
    S: Signal,
    F: Fn(Arc<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallbackResult> + Send + 'static,
{
    Arc::new(move |payload: Payload| match payload.downcast::<S>() {
        Ok(signal) => f(signal).boxed(),
        Err(_) => futures::future::ready(Err(payload_mismatch::<S>())).boxed(),
    })
}

fn payload_mismatch<S: Signal>() -> anyhow::Error {
    anyhow::anyhow!(
        "payload delivered to a receiver of '{}' has a different type",
        SignalKind::of::<S>()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Ping(usize);

    #[test]
    fn test_ids_are_unique_and_shared_by_clones() {
        let a = Receiver::sync(|_: &Ping| {});
        let b = Receiver::sync(|_: &Ping| {});
        let a2 = a.clone();

        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a2.id());
        assert_eq!(a, a2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_styles() {
        assert_eq!(Receiver::sync(|_: &Ping| {}).style(), BindingStyle::Sync);
        assert_eq!(
            Receiver::task(|_: Arc<Ping>| async { Ok(()) }).style(),
            BindingStyle::AsyncTask
        );
        assert_eq!(
            Receiver::lightweight(|_: Arc<Ping>| async { Ok(()) }).style(),
            BindingStyle::AsyncLightweight
        );
    }

    #[test]
    fn test_sync_downcast() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        let receiver = Receiver::sync(move |ping: &Ping| {
            seen_clone.store(ping.0, Ordering::SeqCst);
        });

        let Handler::Sync(callback) = receiver.handler() else {
            panic!("Expected sync handler");
        };
        callback(&Ping(7)).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 7);

        let err = callback(&"not a ping").unwrap_err();
        assert!(err.to_string().contains("Ping"));
    }

    #[tokio::test]
    async fn test_async_downcast() {
        let receiver = Receiver::lightweight(|ping: Arc<Ping>| async move {
            anyhow::ensure!(ping.0 == 3, "unexpected ping {}", ping.0);
            Ok(())
        });

        let Handler::AsyncLightweight(callback) = receiver.handler() else {
            panic!("Expected lightweight handler");
        };
        callback(Arc::new(Ping(3))).await.unwrap();
        assert!(callback(Arc::new(Ping(4))).await.is_err());
        assert!(callback(Arc::new(5u8)).await.is_err());
    }
}
