//! # Distributor — the multicast primitive behind live delivery.
//!
//! A [`Distributor`] holds the named subscriptions of one queue and pushes
//! each published batch to every current subscriber, in subscription order.
//! It never buffers: a subscriber registered after a batch was published will
//! not see that batch (catching up on history is the cutover protocol's job,
//! not the distributor's).
//!
//! ## Architecture
//! ```text
//! Queue::enqueue_batch ──► publish(batch)
//!                             │  snapshot subscriber list (short lock),
//!                             │  then deliver with the lock released
//!                             ├──► subscription 1  (first subscribed)
//!                             ├──► subscription 2
//!                             └──► subscription N  (last subscribed)
//! ```
//!
//! ## Rules
//! - **Keys are unique**: re-subscribing an existing key replaces the callback
//!   in place (last-write-wins) and keeps its position in the delivery order.
//! - **Unsubscribe is quiet**: removing an unknown key is a no-op.
//! - **Batches, not messages**: callbacks always receive a whole published
//!   batch, one or more messages.
//! - **No lock across delivery**: `publish` clones the delivery list under a
//!   short read lock and drops the guard before awaiting any callback.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::queue::queue::{Queue, QueueId};

/// One published group of messages, shared by every subscriber of the batch.
pub(crate) type Batch<T> = Arc<[T]>;

/// Subscriber callback. Receives batches in strict publish order for its key.
pub(crate) type BatchFn<T> = Arc<dyn Fn(Batch<T>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Global counter behind [`SubKey::Auto`].
static KEY_SEQ: AtomicU64 = AtomicU64::new(0);

/// Identity of one subscription on a [`Distributor`].
///
/// `Source` carries a queue identity so that a forwarding wire keyed by its
/// destination is recognized idempotently: wiring the same source into the
/// same destination twice replaces the wire instead of duplicating it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum SubKey {
    /// Caller-chosen name.
    Named(Arc<str>),
    /// Identity of the destination behind a forwarding wire.
    Source(QueueId),
    /// Unique anonymous key.
    Auto(u64),
}

impl SubKey {
    #[allow(dead_code)]
    pub(crate) fn named(name: impl Into<Arc<str>>) -> Self {
        SubKey::Named(name.into())
    }

    /// Returns a fresh key no other subscription can collide with.
    pub(crate) fn auto() -> Self {
        SubKey::Auto(KEY_SEQ.fetch_add(1, Ordering::Relaxed))
    }
}

struct Subscription<T> {
    key: SubKey,
    deliver: BatchFn<T>,
}

/// Multicast registry for one queue.
///
/// Delivery order is first-subscription order. The subscriber count is
/// mirrored in an atomic so the enqueue path can take its buffer-vs-publish
/// decision without touching the registry lock.
pub(crate) struct Distributor<T> {
    source: QueueId,
    subs: RwLock<Vec<Subscription<T>>>,
    active: AtomicUsize,
}

impl<T: Clone + Send + Sync + 'static> Distributor<T> {
    pub(crate) fn new(source: QueueId) -> Self {
        Self {
            source,
            subs: RwLock::new(Vec::new()),
            active: AtomicUsize::new(0),
        }
    }

    /// Identity of the queue this distributor originates from.
    pub(crate) fn source(&self) -> QueueId {
        self.source
    }

    /// True when no subscription is registered.
    ///
    /// Read under the backlog lock by the enqueue path; subscription updates
    /// publish the new count with release ordering so a routing decision made
    /// after a subscribe always observes it.
    pub(crate) fn is_idle(&self) -> bool {
        self.active.load(Ordering::Acquire) == 0
    }

    /// Registers `deliver` under `key`.
    ///
    /// Re-subscribing an existing key replaces the callback in place:
    /// last-write-wins, delivery position unchanged.
    pub(crate) async fn subscribe(&self, key: SubKey, deliver: BatchFn<T>) {
        let mut subs = self.subs.write().await;
        if let Some(existing) = subs.iter_mut().find(|s| s.key == key) {
            existing.deliver = deliver;
        } else {
            subs.push(Subscription { key, deliver });
            self.active.fetch_add(1, Ordering::Release);
        }
    }

    /// Removes the subscription under `key`, if any.
    ///
    /// Unknown keys are a silent no-op. Returns whether a subscription was
    /// removed. In-flight deliveries are not retracted.
    pub(crate) async fn unsubscribe(&self, key: &SubKey) -> bool {
        let mut subs = self.subs.write().await;
        let before = subs.len();
        subs.retain(|s| s.key != *key);
        let removed = subs.len() < before;
        if removed {
            self.active.fetch_sub(1, Ordering::Release);
        }
        removed
    }

    /// Delivers `batch` to every current subscriber, in subscription order.
    ///
    /// The delivery list is snapshotted under a short read lock and the guard
    /// dropped before any callback runs, so a slow subscriber never blocks
    /// registry updates. Subscribers added after the snapshot do not see this
    /// batch.
    pub(crate) async fn publish(&self, batch: Batch<T>) {
        let targets: Vec<BatchFn<T>> = {
            let subs = self.subs.read().await;
            subs.iter().map(|s| s.deliver.clone()).collect()
        };
        for deliver in targets {
            deliver(batch.clone()).await;
        }
    }

    /// Wires every future publish of this distributor into `dest`.
    ///
    /// Batches are enqueued into the destination queue (which re-routes them
    /// live if the destination has its own subscribers). Keyed by the
    /// destination's identity, so piping the same pair twice is idempotent.
    #[allow(dead_code)]
    pub(crate) async fn pipe_into(&self, dest: &Arc<Queue<T>>) {
        let key = SubKey::Source(dest.id());
        let dest = dest.clone();
        self.subscribe(
            key,
            Arc::new(move |batch: Batch<T>| {
                let dest = dest.clone();
                Box::pin(async move { dest.enqueue_batch(batch.to_vec()).await })
            }),
        )
        .await;
    }
}
