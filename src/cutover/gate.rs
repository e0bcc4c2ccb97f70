//! # Cutover gate - exactly-once promotion from backlog to live delivery.
//!
//! Promoting a consumer from polled/backlog consumption to live/subscribed
//! consumption races against producers: a message being enqueued while the
//! subscription is registered must land either in the snapshot replayed to
//! the new handler or in its live stream — exactly once, in order.
//!
//! ## Architecture
//! ```text
//! establish(distributor, key, handler)
//!     │
//!     └─► subscribe(key, gate-wrapped handler)
//!              │
//!              │  per delivered batch:
//!              ├─ Phase::Pending ──► park batch (in arrival order)
//!              └─ Phase::Active  ──► lock monitor ──► handler(batch)
//!
//! caller (every composition operation):
//!     lock monitor                       ◄── ordering barrier
//!     activate(queue):
//!         lock backlog ── lock phase     ◄── one atomic critical section
//!         drain backlog ++ parked
//!         phase = Active, latch.set()
//!     handler(snapshot)                  ◄── replay, monitor still held
//!     unlock monitor                     ◄── first live batch may now land
//! ```
//!
//! ## Rules
//! - **Replay precedes live**: the wrapper acquires the monitor before
//!   invoking the handler, and the caller holds the monitor across
//!   `activate` + replay, so no live batch reaches the handler until the
//!   snapshot replay has completed.
//! - **Nothing in neither**: the backlog drain, the parked drain, and the
//!   phase flip share one critical section with the enqueue routing check,
//!   so every message lands in the snapshot or the live stream.
//! - **Parked order holds**: batches parked while Pending always postdate
//!   the buffered backlog (the backlog only grows while the distributor is
//!   idle), so `backlog ++ parked` is original enqueue order.
//! - **One gate per cutover**: the latch+monitor pair bridges the instant of
//!   registration and is discarded once the subscription is established.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::cutover::Latch;
use crate::queue::{Batch, BatchFn, Distributor, Queue, SubKey};

/// Delivery phase of one cutover.
///
/// `Pending` parks batches that arrive between subscription and activation —
/// the narrow race the protocol exists to close. `Active` is terminal.
enum Phase<T> {
    Pending(Vec<T>),
    Active,
}

/// Latch, monitor, and phase state for one cutover.
///
/// Cheap to clone; all clones share state. The wrapper registered on the
/// distributor holds one clone, the establishing caller another.
pub(crate) struct CutoverGate<T> {
    latch: Latch,
    monitor: Arc<Mutex<()>>,
    phase: Arc<Mutex<Phase<T>>>,
}

impl<T> Clone for CutoverGate<T> {
    fn clone(&self) -> Self {
        Self {
            latch: self.latch.clone(),
            monitor: self.monitor.clone(),
            phase: self.phase.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> CutoverGate<T> {
    fn new() -> Self {
        Self {
            latch: Latch::new(),
            monitor: Arc::new(Mutex::new(())),
            phase: Arc::new(Mutex::new(Phase::Pending(Vec::new()))),
        }
    }

    /// Subscribes `key` on `distributor` with a gate-wrapped `handler` and
    /// returns the gate, without blocking.
    ///
    /// The wrapper parks batches while the gate is Pending and delivers them
    /// under the monitor once Active. The caller completes the cutover with
    /// [`CutoverGate::activate`] while holding the monitor.
    pub(crate) async fn establish(
        distributor: &Distributor<T>,
        key: SubKey,
        handler: BatchFn<T>,
    ) -> CutoverGate<T> {
        let gate = CutoverGate::new();
        let wrapper: BatchFn<T> = {
            let gate = gate.clone();
            Arc::new(move |batch: Batch<T>| {
                let gate = gate.clone();
                let handler = handler.clone();
                Box::pin(async move { gate.deliver(batch, handler).await })
            })
        };
        distributor.subscribe(key, wrapper).await;
        gate
    }

    /// Routes one delivered batch through the gate.
    async fn deliver(&self, batch: Batch<T>, handler: BatchFn<T>) {
        if !self.latch.is_set() {
            let mut phase = self.phase.lock().await;
            if let Phase::Pending(parked) = &mut *phase {
                parked.extend(batch.iter().cloned());
                return;
            }
            // Activated between the latch read and the phase lock: fall
            // through to ordered live delivery.
        }
        let _ordered = self.monitor.lock().await;
        handler(batch).await;
    }

    /// Drains the backlog plus any parked batches and flips the gate Active,
    /// all inside one critical section. Returns the snapshot, in original
    /// enqueue order.
    ///
    /// The caller must hold the monitor, and must keep holding it until the
    /// snapshot has been replayed to the handler.
    pub(crate) async fn activate(&self, queue: &Queue<T>) -> Vec<T> {
        let mut backlog = queue.backlog_guard().await;
        let mut phase = self.phase.lock().await;
        let mut snapshot: Vec<T> = backlog.drain(..).collect();
        if let Phase::Pending(parked) = &mut *phase {
            snapshot.append(parked);
        }
        *phase = Phase::Active;
        self.latch.set();
        snapshot
    }

    /// The per-cutover ordering barrier.
    pub(crate) fn monitor(&self) -> &Arc<Mutex<()>> {
        &self.monitor
    }
}

/// Runs the full cutover calling pattern for `handler` on `queue`:
/// establish, then snapshot-and-activate and replay under the monitor.
///
/// On return the subscription is live; every message the queue ever carried
/// has reached `handler` exactly once, in order, and all future batches will
/// follow.
pub(crate) async fn cut_over<T: Clone + Send + Sync + 'static>(
    queue: &Queue<T>,
    key: SubKey,
    handler: BatchFn<T>,
) {
    let gate = CutoverGate::establish(queue.distributor(), key, handler.clone()).await;
    let _ordered = gate.monitor().lock().await;
    let snapshot = gate.activate(queue).await;
    if !snapshot.is_empty() {
        handler(Batch::from(snapshot)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::Mutex as AsyncMutex;

    fn recorder(log: Arc<AsyncMutex<Vec<i32>>>) -> BatchFn<i32> {
        Arc::new(move |batch: Batch<i32>| {
            let log = log.clone();
            Box::pin(async move {
                log.lock().await.extend(batch.iter().copied());
            })
        })
    }

    #[tokio::test]
    async fn test_backlog_replays_before_live_batches() {
        let q: Arc<Queue<i32>> = Queue::new(None);
        q.enqueue_batch(vec![1, 2, 3]).await;

        let log = Arc::new(AsyncMutex::new(Vec::new()));
        cut_over(&q, SubKey::auto(), recorder(log.clone())).await;

        q.enqueue(4).await;
        q.enqueue(5).await;

        assert_eq!(*log.lock().await, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_batches_parked_while_pending_are_replayed_in_order() {
        let q: Arc<Queue<i32>> = Queue::new(None);
        q.enqueue(1).await;

        let log = Arc::new(AsyncMutex::new(Vec::new()));
        let gate = CutoverGate::establish(q.distributor(), SubKey::auto(), recorder(log.clone())).await;

        // subscription exists but the gate is still Pending: these route live
        // and must be parked, not delivered and not lost
        q.enqueue(2).await;
        q.enqueue(3).await;
        assert!(log.lock().await.is_empty(), "pending gate must not deliver");
        assert!(!gate.latch.is_set());

        let handler = recorder(log.clone());
        let guard = gate.monitor().lock().await;
        let snapshot = gate.activate(&q).await;
        assert_eq!(snapshot, vec![1, 2, 3]);
        handler(Batch::from(snapshot)).await;
        drop(guard);

        q.enqueue(4).await;
        assert_eq!(*log.lock().await, vec![1, 2, 3, 4]);
        assert!(gate.latch.is_set());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_exactly_once_under_concurrent_enqueues() {
        for _ in 0..20 {
            let q: Arc<Queue<u32>> = Queue::new(None);
            for n in 0..50u32 {
                q.enqueue(n).await;
            }

            let log = Arc::new(AsyncMutex::new(Vec::new()));
            let producer = {
                let q = q.clone();
                tokio::spawn(async move {
                    for n in 50..100u32 {
                        q.enqueue(n).await;
                        if n % 8 == 0 {
                            tokio::time::sleep(Duration::from_micros(50)).await;
                        }
                    }
                })
            };

            cut_over(&q, SubKey::auto(), recorder_u32(log.clone())).await;
            producer.await.expect("producer task panicked");

            let seen = log.lock().await.clone();
            assert_eq!(seen.len(), 100, "loss or duplication across the cutover");
            assert_eq!(seen, (0..100).collect::<Vec<u32>>(), "reordering across the cutover");
        }
    }

    fn recorder_u32(log: Arc<AsyncMutex<Vec<u32>>>) -> BatchFn<u32> {
        Arc::new(move |batch: Batch<u32>| {
            let log = log.clone();
            Box::pin(async move {
                log.lock().await.extend(batch.iter().copied());
            })
        })
    }
}
