//! # Channel - the externally-visible conduit handle.
//!
//! A [`Channel`] owns exactly one queue (backlog + distributor); the queue is
//! private to it. Handles are cheap to clone and share one underlying
//! conduit.
//!
//! ## Architecture
//! ```text
//! producers                 Channel                     consumers
//!   enqueue ──► Queue ──┬─ backlog (idle) ──► try_dequeue / poll_message
//!                       └─ Distributor (live) ──► receive_all registrations
//!                                            ──► siphon wires ──► other channels
//! ```
//!
//! ## Delivery variants
//! Every public operation resolves the channel's delivery variant once per
//! call and dispatches on it:
//! - **Closed** — terminal; cutover-style registrations report failure.
//! - **Constant** — single-value channel, exempt from the cutover protocol;
//!   at most one value reaches all current and future receivers.
//! - **Live** — regular conduit; registrations run the cutover protocol.
//!
//! ## Rules
//! - `close()` is terminal and monotonic; enqueues after close are rejected.
//! - Dequeue-style consumption and subscription-style consumption may be
//!   mixed, but a message claimed by one is gone for the other (the backlog
//!   invariant: snapshot or dequeue, never both, never neither).

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::channel::config::ChannelConfig;
use crate::channel::constant::ConstantCell;
use crate::channel::receive::ReceiveRef;
use crate::consume::{self, PollOutcome, PullBudget};
use crate::error::ChannelError;
use crate::ops;
use crate::queue::{next_queue_id, Queue, QueueId, Transform};

/// The two channel bodies behind one public handle.
pub(crate) enum Body<T> {
    Conduit(Arc<Queue<T>>),
    Constant(ConstantCell<T>),
}

/// Delivery variant of a channel, resolved once per public operation.
pub(crate) enum Delivery<'a, T> {
    Closed,
    Constant(&'a ConstantCell<T>),
    Live(&'a Arc<Queue<T>>),
}

struct ChannelInner<T> {
    body: Body<T>,
    closed: CancellationToken,
    closed_once: AtomicBool,
}

/// In-memory single-producer/multi-consumer message conduit.
///
/// Messages accumulate in a backlog while nobody is listening and are pushed
/// to registered receivers once a live subscription exists; the transition
/// between the two modes loses, duplicates, and reorders nothing.
///
/// ### Properties
/// - **Cloneable**: handles share one conduit (internally `Arc`-backed).
/// - **Unbounded**: the backlog grows as needed; no back-pressure to
///   producers.
/// - **FIFO**: delivery follows enqueue order, per batch.
pub struct Channel<T> {
    inner: Arc<ChannelInner<T>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.source_id())
            .field("constant", &self.is_constant())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Channel<T> {
    /// Creates an open, empty channel with default configuration.
    pub fn new() -> Self {
        Self::with_config(ChannelConfig::default())
    }

    /// Creates an open, empty channel with the given configuration.
    pub fn with_config(cfg: ChannelConfig) -> Self {
        Self::from_queue(Queue::new(cfg.capacity_hint()))
    }

    /// Creates a constant channel already holding its single value.
    ///
    /// A constant channel delivers at most one value to all current and
    /// future receivers and bypasses the cutover protocol entirely.
    pub fn constant(value: T) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                body: Body::Constant(ConstantCell::new(next_queue_id(), Some(value))),
                closed: CancellationToken::new(),
                closed_once: AtomicBool::new(false),
            }),
        }
    }

    /// Creates a constant channel whose single value is set by the first
    /// `enqueue`. Receivers registered before that observe the value when it
    /// arrives.
    pub fn constant_deferred() -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                body: Body::Constant(ConstantCell::new(next_queue_id(), None)),
                closed: CancellationToken::new(),
                closed_once: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn from_queue(queue: Arc<Queue<T>>) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                body: Body::Conduit(queue),
                closed: CancellationToken::new(),
                closed_once: AtomicBool::new(false),
            }),
        }
    }

    // ---------------------------
    // Lifecycle
    // ---------------------------

    /// True once the channel has been closed. Monotonic.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.is_cancelled()
    }

    /// True for single-value constant channels.
    pub fn is_constant(&self) -> bool {
        matches!(self.inner.body, Body::Constant(_))
    }

    /// Closes the channel. Terminal: later cutover-style registrations report
    /// failure and later enqueues are rejected; the remaining backlog stays
    /// pollable.
    ///
    /// Returns `true` for the call that performed the close, `false` if the
    /// channel was already closed.
    pub fn close(&self) -> bool {
        if self.inner.closed_once.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.inner.closed.cancel();
        true
    }

    // ---------------------------
    // Producing
    // ---------------------------

    /// Appends one message to the channel's stream.
    ///
    /// Buffered into the backlog while nobody is live-subscribed; pushed to
    /// subscribers otherwise. On a constant channel, sets the single value
    /// (first enqueue wins). Returns `false` if the channel is closed or the
    /// constant value was already set.
    pub async fn enqueue(&self, msg: T) -> bool {
        if self.is_closed() {
            return false;
        }
        match &self.inner.body {
            Body::Conduit(queue) => {
                queue.enqueue(msg).await;
                true
            }
            Body::Constant(cell) => cell.set(msg).await,
        }
    }

    /// Appends several messages as one batch.
    ///
    /// The batch is delivered to subscribers as a unit (per-batch grouping is
    /// preserved through transforms). An empty batch is a no-op that reports
    /// the channel's writability.
    pub async fn enqueue_all(&self, msgs: Vec<T>) -> bool {
        if self.is_closed() {
            return false;
        }
        match &self.inner.body {
            Body::Conduit(queue) => {
                if msgs.is_empty() {
                    return true;
                }
                queue.enqueue_batch(msgs).await;
                true
            }
            Body::Constant(cell) => match msgs.into_iter().next() {
                Some(first) => cell.set(first).await,
                None => cell.get().await.is_none(),
            },
        }
    }

    // ---------------------------
    // Direct consumption (fast path, no subscription)
    // ---------------------------

    /// Non-blocking dequeue: removes and returns the head of the backlog.
    ///
    /// `None` means the backlog is empty — messages routed to live
    /// subscribers never appear here. On a constant channel this returns the
    /// value without consuming it.
    pub async fn try_dequeue(&self) -> Option<T> {
        match &self.inner.body {
            Body::Conduit(queue) => queue.dequeue().await,
            Body::Constant(cell) => cell.get().await,
        }
    }

    /// Blocks until a message is available, the channel closes, or `timeout`
    /// elapses (`None` = no limit). The lower-level primitive behind
    /// [`wait_for_message`](Channel::wait_for_message) and the stream.
    pub async fn poll_message(&self, timeout: Option<Duration>) -> PollOutcome<T> {
        consume::poll_message(self, timeout).await
    }

    /// Waits for a single message.
    ///
    /// Fast path: dequeues directly from a non-empty backlog. Otherwise
    /// blocks up to `timeout` (`None` = no limit) and fails with
    /// [`ChannelError::TimedOut`] when the deadline passes, or
    /// [`ChannelError::Closed`] when the channel closes with nothing left.
    pub async fn wait_for_message(&self, timeout: Option<Duration>) -> Result<T, ChannelError> {
        consume::wait_for_message(self, timeout).await
    }

    /// Lazy, pull-driven stream over the channel.
    ///
    /// Each element is materialized only when demanded: one demanded element
    /// is one poll against the channel, bounded by `budget`. The stream ends
    /// when a pull times out or the channel closes with nothing left;
    /// abandoning it early is safe (`take(k)` performs exactly `k` pulls).
    pub fn stream(&self, budget: PullBudget) -> BoxStream<'static, T> {
        consume::stream(self.clone(), budget)
    }

    /// Eagerly materializes every message obtainable within `budget` of
    /// wall-clock time from now (`None` = unlimited, i.e. until the channel
    /// closes; `Some(0)` = only what is immediately available).
    pub async fn drain(&self, budget: Option<Duration>) -> Vec<T> {
        consume::drain(self, budget).await
    }

    // ---------------------------
    // Composition (cutover-protocol operations)
    // ---------------------------

    /// Registers `receivers` for every message the channel ever carries —
    /// the buffered backlog first, then all future messages — each batch
    /// delivered to all receivers in registration order.
    ///
    /// Returns `false` if the channel is already closed (nothing registered;
    /// poll the remaining backlog directly instead). On a constant channel,
    /// each receiver observes the single value.
    pub async fn receive_all(&self, receivers: Vec<ReceiveRef<T>>) -> bool {
        ops::receive_all(self, receivers).await
    }

    /// Wires this channel's full stream (backlog + live) into every
    /// destination, each through its own transform.
    ///
    /// The wire persists for the life of the source; re-siphoning into the
    /// same single destination replaces the wire instead of duplicating it,
    /// and a wire from a channel back into itself is recognized and skipped.
    /// Longer cycles are the caller's responsibility: forwarding graphs must
    /// stay acyclic.
    ///
    /// Returns `false` for closed sources. A constant source delivers its
    /// single value, transformed, to each destination once.
    pub async fn siphon<U>(&self, destinations: Vec<(Channel<U>, Transform<T, U>)>) -> bool
    where
        U: Clone + Send + Sync + 'static,
    {
        ops::siphon(self, destinations).await
    }

    /// Duplicates the current backlog into one independent channel.
    /// See [`fork_n`](Channel::fork_n).
    pub async fn fork(&self) -> Channel<T> {
        let mut forks = self.fork_n(1).await;
        // fork_n(1) always yields exactly one channel
        forks.remove(0)
    }

    /// Duplicates the current backlog into `n` independent channels — a
    /// snapshot fan-out, not a live one: the copies do not follow future
    /// messages, and consuming one copy does not affect another.
    ///
    /// Closed and constant sources need no copying (their content is fixed);
    /// all `n` results are then clones of this handle.
    pub async fn fork_n(&self, n: usize) -> Vec<Channel<T>> {
        ops::fork_n(self, n).await
    }

    /// Derived channel carrying `f` applied to every message, per batch.
    ///
    /// ## Example
    /// ```rust
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// use sluice::Channel;
    ///
    /// let ch: Channel<i64> = Channel::new();
    /// ch.enqueue_all(vec![1, 2, 3]).await;
    ///
    /// let bumped = ch.map(|v| v + 1).await;
    /// assert_eq!(bumped.drain(Some(std::time::Duration::ZERO)).await, vec![2, 3, 4]);
    /// # }
    /// ```
    pub async fn map<U, F>(&self, f: F) -> Channel<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        ops::map(self, f).await
    }

    /// Derived channel carrying only the messages `pred` accepts, per batch.
    pub async fn filter<F>(&self, pred: F) -> Channel<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        ops::filter(self, pred).await
    }

    // ---------------------------
    // Crate internals
    // ---------------------------

    pub(crate) fn body(&self) -> &Body<T> {
        &self.inner.body
    }

    /// Resolves the delivery variant once for the current call.
    pub(crate) fn delivery(&self) -> Delivery<'_, T> {
        if self.is_closed() {
            return Delivery::Closed;
        }
        match &self.inner.body {
            Body::Constant(cell) => Delivery::Constant(cell),
            Body::Conduit(queue) => Delivery::Live(queue),
        }
    }

    pub(crate) fn closed_token(&self) -> &CancellationToken {
        &self.inner.closed
    }

    /// Identity of the conduit behind this handle (queue or constant cell),
    /// used as an idempotent forwarding key.
    pub(crate) fn source_id(&self) -> QueueId {
        match &self.inner.body {
            Body::Conduit(queue) => queue.id(),
            Body::Constant(cell) => cell.id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_close_is_terminal_and_reported_once() {
        let ch: Channel<i32> = Channel::new();
        assert!(!ch.is_closed());
        assert!(ch.close());
        assert!(!ch.close(), "second close must report already-closed");
        assert!(ch.is_closed());
    }

    #[tokio::test]
    async fn test_enqueue_after_close_is_rejected() {
        let ch: Channel<i32> = Channel::new();
        assert!(ch.enqueue(1).await);
        ch.close();
        assert!(!ch.enqueue(2).await);

        // the backlog from before the close stays pollable
        assert_eq!(ch.try_dequeue().await, Some(1));
        assert_eq!(ch.try_dequeue().await, None);
    }

    #[tokio::test]
    async fn test_clones_share_the_conduit() {
        let ch: Channel<&'static str> = Channel::new();
        let other = ch.clone();
        ch.enqueue("hello").await;
        assert_eq!(other.try_dequeue().await, Some("hello"));
    }

    #[tokio::test]
    async fn test_constant_channel_sets_once_and_never_consumes() {
        let ch: Channel<i32> = Channel::constant_deferred();
        assert!(ch.is_constant());
        assert!(ch.enqueue(5).await);
        assert!(!ch.enqueue(6).await, "constant value already set");

        assert_eq!(ch.try_dequeue().await, Some(5));
        assert_eq!(ch.try_dequeue().await, Some(5), "constant reads are non-destructive");
    }
}
