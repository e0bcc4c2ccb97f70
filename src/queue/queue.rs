//! # Queue — ordered, unbounded backlog with live routing.
//!
//! A [`Queue`] owns the buffered messages of one channel and its companion
//! [`Distributor`]. The queue makes the core routing decision on every
//! enqueue: with no live subscriber the batch is buffered into the backlog;
//! with at least one subscriber it is published instead.
//!
//! ## Rules
//! - **Backlog invariant**: a message is in the backlog exactly until it is
//!   dequeued by a direct consumer or captured by a cutover snapshot — never
//!   both, never neither. The routing check runs under the backlog lock, and
//!   a snapshot drains under the same lock, so a buffered message is always
//!   visible to the snapshot that follows it.
//! - **Publish order**: live publishes are serialized by a dedicated route
//!   lock; "publish order" is route-lock acquisition order. With the single
//!   producer of the SPMC model this is exactly enqueue order.
//! - **Destructive dequeue**: `dequeue` removes the head; `None` means empty.
//! - **Arrivals wake pollers**: buffering notifies blocked pollers; published
//!   batches go to subscribers and are never observable by pollers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, Notify};

use crate::queue::distributor::{Batch, Distributor};
use crate::queue::Transform;

/// Identity of one queue, unique for the lifetime of the process.
pub(crate) type QueueId = u64;

/// Global identity counter for queues (and constant cells).
static QUEUE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Allocates a fresh queue identity.
pub(crate) fn next_queue_id() -> QueueId {
    QUEUE_SEQ.fetch_add(1, Ordering::Relaxed)
}

/// Backlog plus distributor for one channel.
pub(crate) struct Queue<T> {
    id: QueueId,
    backlog: Mutex<VecDeque<T>>,
    distributor: Distributor<T>,
    /// Serializes live publishes so batches reach subscribers in one order.
    route: Mutex<()>,
    /// Wakes pollers blocked on an empty backlog.
    arrivals: Notify,
}

impl<T: Clone + Send + Sync + 'static> Queue<T> {
    pub(crate) fn new(capacity_hint: Option<usize>) -> Arc<Self> {
        let backlog = match capacity_hint {
            Some(cap) => VecDeque::with_capacity(cap),
            None => VecDeque::new(),
        };
        let id = next_queue_id();
        Arc::new(Self {
            id,
            backlog: Mutex::new(backlog),
            distributor: Distributor::new(id),
            route: Mutex::new(()),
            arrivals: Notify::new(),
        })
    }

    /// Builds a queue whose backlog starts as `messages` (used by copies).
    pub(crate) fn preloaded(messages: Vec<T>) -> Arc<Self> {
        let id = next_queue_id();
        Arc::new(Self {
            id,
            backlog: Mutex::new(messages.into()),
            distributor: Distributor::new(id),
            route: Mutex::new(()),
            arrivals: Notify::new(),
        })
    }

    pub(crate) fn id(&self) -> QueueId {
        self.id
    }

    pub(crate) fn distributor(&self) -> &Distributor<T> {
        &self.distributor
    }

    pub(crate) fn arrivals(&self) -> &Notify {
        &self.arrivals
    }

    /// Appends one message; see [`Queue::enqueue_batch`].
    pub(crate) async fn enqueue(&self, msg: T) {
        self.enqueue_batch(vec![msg]).await;
    }

    /// Routes one batch: buffered into the backlog when nobody is live,
    /// published to the distributor otherwise.
    ///
    /// The idle check and the buffer append run under the backlog lock; the
    /// cutover snapshot serializes on the same lock, so the batch lands either
    /// in the snapshot or in the live stream, never in neither.
    pub(crate) async fn enqueue_batch(&self, msgs: Vec<T>) {
        if msgs.is_empty() {
            return;
        }
        let _route = self.route.lock().await;
        {
            let mut backlog = self.backlog.lock().await;
            if self.distributor.is_idle() {
                backlog.extend(msgs);
                drop(backlog);
                self.arrivals.notify_waiters();
                return;
            }
        }
        self.distributor.publish(Batch::from(msgs)).await;
    }

    /// Removes and returns the head of the backlog, or `None` when empty.
    pub(crate) async fn dequeue(&self) -> Option<T> {
        self.backlog.lock().await.pop_front()
    }

    /// Locks the backlog for a cutover snapshot.
    ///
    /// Only the cutover activation path uses this; everything else goes
    /// through `enqueue_batch`/`dequeue`.
    pub(crate) async fn backlog_guard(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.backlog.lock().await
    }

    /// Returns one independent new queue per transform, each preloaded with
    /// the current backlog passed through that transform.
    ///
    /// The original backlog is only read; its state is unaffected beyond the
    /// read.
    pub(crate) async fn copy(&self, transforms: &[Transform<T, T>]) -> Vec<Arc<Queue<T>>> {
        let snapshot: Vec<T> = {
            let backlog = self.backlog.lock().await;
            backlog.iter().cloned().collect()
        };
        transforms
            .iter()
            .map(|transform| Queue::preloaded(transform(&snapshot)))
            .collect()
    }
}
