//! Generic publish/subscribe bus with asynchronous, ordered fan-out.
//!
//! [`EventBus`] maps each event kind to an ordered list of [`Listener`]s.
//! Publishing snapshots the current list and hands delivery to the shared
//! [`Dispatcher`], so `publish` never blocks the caller.
//!
//! # Concurrency
//!
//! Per-kind listener lists are copy-on-write `Arc<Vec<_>>` values. A publish
//! holds the table lock only long enough to clone one `Arc`; delivery iterates
//! the snapshot without any lock, so listeners may subscribe or unsubscribe
//! (even from inside a callback) while a dispatch is in flight.
//!
//! The forward map (kind → listeners) and the reverse map (listener → kind)
//! live behind the same lock and change together.
//!
//! # Ordering
//!
//! One publish delivers to its snapshot in subscription order. Distinct publish
//! calls are only ordered relative to each other when the dispatcher runs a
//! single worker, or when the caller waits on the [`Awaiter`].
//!
//! # Example
//!
//! ```
//! use probemap::bus::{Dispatcher, EventBus, Listener};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let bus: EventBus<&'static str, u32> = EventBus::new(Dispatcher::new("doc-bus", 1)?);
//! let total = Arc::new(AtomicUsize::new(0));
//! let sink = Arc::clone(&total);
//! let listener = Listener::new(move |value: &u32| {
//!     sink.fetch_add(*value as usize, Ordering::SeqCst);
//! });
//!
//! bus.subscribe("probe", &listener);
//! bus.publish_and_await("probe", 7).wait();
//! assert_eq!(total.load(Ordering::SeqCst), 7);
//! # Ok::<(), probemap::ProbeMapError>(())
//! ```

use super::dispatch::Dispatcher;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a listener, stable across clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// A subscriber callback with a unique identity.
///
/// Cloning keeps the identity, so a clone can be used to unsubscribe.
pub struct Listener<P> {
    id: ListenerId,
    callback: Arc<dyn Fn(&P) + Send + Sync>,
}

impl<P> Listener<P> {
    pub fn new(callback: impl Fn(&P) + Send + Sync + 'static) -> Self {
        Self {
            id: ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed)),
            callback: Arc::new(callback),
        }
    }

    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    fn deliver(&self, payload: &P) {
        (self.callback)(payload);
    }
}

impl<P> Clone for Listener<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<P> fmt::Debug for Listener<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Completion handle returned by [`EventBus::publish_and_await`].
#[derive(Debug)]
#[must_use = "an awaiter does nothing unless waited on"]
pub struct Awaiter {
    done: Option<Receiver<()>>,
}

impl Awaiter {
    const fn ready() -> Self {
        Self { done: None }
    }

    /// True when the dispatch had no listeners and nothing will be delivered.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.done.is_none()
    }

    /// Blocks until the dispatch has reached every listener of its snapshot.
    pub fn wait(self) {
        if let Some(done) = self.done {
            // Disconnection means the job finished (or was dropped); both end the wait.
            let _ = done.recv();
        }
    }

    /// Like [`Awaiter::wait`] with an upper bound. Returns `false` on timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match &self.done {
            None => true,
            Some(done) => !matches!(done.recv_timeout(timeout), Err(RecvTimeoutError::Timeout)),
        }
    }
}

struct SubscriptionTable<K, P> {
    by_kind: HashMap<K, Arc<Vec<Listener<P>>>>,
    kind_of: HashMap<ListenerId, K>,
}

impl<K: Eq + Hash + Clone, P> SubscriptionTable<K, P> {
    fn remove_listener(&mut self, id: ListenerId) -> Option<K> {
        let kind = self.kind_of.remove(&id)?;
        if let Some(current) = self.by_kind.get(&kind) {
            let remaining: Vec<Listener<P>> = current
                .iter()
                .filter(|listener| listener.id != id)
                .cloned()
                .collect();
            if remaining.is_empty() {
                self.by_kind.remove(&kind);
            } else {
                self.by_kind.insert(kind.clone(), Arc::new(remaining));
            }
        }
        Some(kind)
    }
}

struct BusInner<K, P> {
    table: RwLock<SubscriptionTable<K, P>>,
    dispatcher: Dispatcher,
}

/// Thread-safe publish/subscribe bus keyed by event kind.
///
/// Cheap to clone; clones share subscriptions and the dispatcher.
pub struct EventBus<K, P> {
    inner: Arc<BusInner<K, P>>,
}

impl<K, P> Clone for EventBus<K, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, P> fmt::Debug for EventBus<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("dispatcher", &self.inner.dispatcher)
            .finish_non_exhaustive()
    }
}

impl<K, P> EventBus<K, P>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            inner: Arc::new(BusInner {
                table: RwLock::new(SubscriptionTable {
                    by_kind: HashMap::new(),
                    kind_of: HashMap::new(),
                }),
                dispatcher,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SubscriptionTable<K, P>> {
        self.inner.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SubscriptionTable<K, P>> {
        self.inner.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `listener` for `kind`.
    ///
    /// Subscribing a listener to the kind it already listens to is ignored with
    /// a warning. Subscribing it to a different kind moves it there.
    pub fn subscribe(&self, kind: K, listener: &Listener<P>) {
        let mut table = self.write();

        if let Some(existing) = table.kind_of.get(&listener.id) {
            if *existing == kind {
                tracing::warn!(listener = ?listener.id, ?kind, "listener already subscribed, ignoring");
                return;
            }
            let previous = table.remove_listener(listener.id);
            tracing::debug!(listener = ?listener.id, ?previous, ?kind, "moving listener to new kind");
        }

        let mut listeners = table
            .by_kind
            .get(&kind)
            .map(|current| current.as_ref().clone())
            .unwrap_or_default();
        listeners.push(listener.clone());
        let count = listeners.len();

        table.by_kind.insert(kind.clone(), Arc::new(listeners));
        table.kind_of.insert(listener.id, kind.clone());
        drop(table);

        tracing::trace!(listener = ?listener.id, ?kind, count, "listener subscribed");
    }

    /// Removes `listener` from whatever kind it was registered under.
    pub fn unsubscribe(&self, listener: &Listener<P>) {
        self.unsubscribe_id(listener.id);
    }

    /// Removes the listener with `id`; no-op if unknown.
    pub fn unsubscribe_id(&self, id: ListenerId) {
        let removed = self.write().remove_listener(id);
        match removed {
            Some(kind) => tracing::trace!(listener = ?id, ?kind, "listener unsubscribed"),
            None => tracing::trace!(listener = ?id, "unsubscribe of unknown listener ignored"),
        }
    }

    /// Removes every listener registered for `kind`.
    pub fn unsubscribe_all_of(&self, kind: &K) {
        let mut table = self.write();
        if let Some(listeners) = table.by_kind.remove(kind) {
            for listener in listeners.iter() {
                table.kind_of.remove(&listener.id);
            }
            tracing::debug!(?kind, removed = listeners.len(), "kind cleared");
        }
    }

    /// Removes every listener of every kind.
    pub fn unsubscribe_all(&self) {
        let mut table = self.write();
        table.by_kind.clear();
        table.kind_of.clear();
        tracing::debug!("all listeners removed");
    }

    /// Number of listeners currently registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: &K) -> usize {
        self.read().by_kind.get(kind).map_or(0, |listeners| listeners.len())
    }

    /// Number of kinds that currently have at least one listener.
    #[must_use]
    pub fn kind_count(&self) -> usize {
        self.read().by_kind.len()
    }

    fn snapshot(&self, kind: &K) -> Option<Arc<Vec<Listener<P>>>> {
        self.read().by_kind.get(kind).cloned()
    }

    /// Delivers `payload` to the current listeners of `kind` on the dispatcher.
    ///
    /// Returns immediately.
    pub fn publish(&self, kind: K, payload: P) {
        let Some(listeners) = self.snapshot(&kind) else {
            tracing::trace!(?kind, "publish with no listeners");
            return;
        };

        let job = move || deliver(&kind, &listeners, &payload);
        if let Err(e) = self.inner.dispatcher.submit(job) {
            tracing::error!(error = %e, "event dropped");
        }
    }

    /// Like [`EventBus::publish`], returning a handle that waits for delivery.
    ///
    /// With no listeners the returned [`Awaiter`] is already complete.
    pub fn publish_and_await(&self, kind: K, payload: P) -> Awaiter {
        let Some(listeners) = self.snapshot(&kind) else {
            tracing::trace!(?kind, "publish_and_await with no listeners");
            return Awaiter::ready();
        };

        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
        let job = move || {
            deliver(&kind, &listeners, &payload);
            let _ = done_tx.send(());
        };
        if let Err(e) = self.inner.dispatcher.submit(job) {
            tracing::error!(error = %e, "event dropped");
            return Awaiter::ready();
        }

        Awaiter {
            done: Some(done_rx),
        }
    }

    /// Blocks until every dispatch queued so far has been delivered.
    pub fn wait_idle(&self) {
        self.inner.dispatcher.wait_idle();
    }
}

fn deliver<K: fmt::Debug, P>(kind: &K, listeners: &[Listener<P>], payload: &P) {
    for listener in listeners {
        if catch_unwind(AssertUnwindSafe(|| listener.deliver(payload))).is_err() {
            tracing::error!(?kind, listener = ?listener.id, "listener panicked during dispatch");
        }
    }
}
