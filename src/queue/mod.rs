//! Buffered queue and multicast distributor.
//!
//! This module groups the two leaf primitives behind every channel:
//!
//! ## Contents
//! - [`Queue`] ordered, unbounded FIFO backlog with the buffer-vs-publish
//!   routing decision
//! - [`Distributor`] named multicast subscriptions and batch publishing
//! - [`Transform`] batch transform applied by forwarding wires and copies
//!
//! ## Quick reference
//! - **Producers**: `Queue::enqueue_batch` (via `Channel::enqueue`).
//! - **Consumers**: `Queue::dequeue` (direct polling), or a
//!   [`CutoverGate`](crate::cutover::CutoverGate) subscription registered on
//!   the queue's distributor.
//!
//! See `cutover/gate.rs` for the protocol-level wiring diagram.

mod distributor;
mod queue;

use std::sync::Arc;

pub(crate) use distributor::{Batch, BatchFn, Distributor, SubKey};
pub(crate) use queue::{next_queue_id, Queue, QueueId};

/// Batch transform applied by forwarding wires, derived channels, and
/// backlog copies.
///
/// A transform maps one published batch to one output batch; it may grow,
/// shrink, or empty the batch, but per-batch grouping is preserved end to end.
pub type Transform<T, U> = Arc<dyn Fn(&[T]) -> Vec<U> + Send + Sync>;
