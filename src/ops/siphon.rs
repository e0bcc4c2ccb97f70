//! # siphon - forwarding wires from one channel into others.
//!
//! Wires a source channel's full stream (backlog + live) into one or more
//! destination channels, each through its own batch transform. The wire goes
//! through the cutover gate, so the seam between replayed backlog and live
//! forwarding is exactly-once and ordered, and it persists afterwards: the
//! source distributor stays piped into every destination's queue.
//!
//! ## Rules
//! - **One cutover per call**: the replayed backlog reaches every
//!   destination of the call, not just the first.
//! - **Idempotent single wires**: a single-destination wire is keyed by the
//!   destination's identity, so re-siphoning the same pair replaces the wire
//!   instead of duplicating it. Multi-destination calls get an anonymous key
//!   (each call is its own wire).
//! - Transforms map batch to batch; an emptied batch forwards nothing.
//! - **Self-wires are skipped**: the destination key carries the source
//!   queue identity, so a wire from a channel back into itself is recognized
//!   and dropped. Longer cycles are the caller's responsibility; forwarding
//!   graphs must stay acyclic.
//! - Destinations that close later drop forwarded batches silently.

use std::sync::Arc;

use crate::channel::{Channel, Delivery};
use crate::cutover::cut_over;
use crate::queue::{Batch, BatchFn, SubKey, Transform};

/// Applies each destination's transform and enqueues the result, in
/// destination order.
fn fanout_fn<T, U>(destinations: Vec<(Channel<U>, Transform<T, U>)>) -> BatchFn<T>
where
    T: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
{
    let destinations = Arc::new(destinations);
    Arc::new(move |batch: Batch<T>| {
        let destinations = destinations.clone();
        Box::pin(async move {
            for (dest, transform) in destinations.iter() {
                let out = transform(&batch);
                if !out.is_empty() {
                    // a closed destination rejects the batch; tolerated
                    let _ = dest.enqueue_all(out).await;
                }
            }
        })
    })
}

pub(crate) async fn siphon<T, U>(
    source: &Channel<T>,
    destinations: Vec<(Channel<U>, Transform<T, U>)>,
) -> bool
where
    T: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
{
    if destinations.is_empty() {
        return !source.is_closed();
    }
    match source.delivery() {
        Delivery::Closed => false,
        Delivery::Constant(cell) => {
            cell.deliver(fanout_fn(destinations)).await;
            true
        }
        Delivery::Live(queue) => {
            // a wire from a queue back into itself is recognized by the
            // source identity and skipped: it would re-route every publish
            // into the producer
            let self_id = queue.distributor().source();
            let destinations: Vec<(Channel<U>, Transform<T, U>)> = destinations
                .into_iter()
                .filter(|(dest, _)| dest.source_id() != self_id)
                .collect();
            if destinations.is_empty() {
                return true;
            }
            let key = match destinations.as_slice() {
                [(only, _)] => SubKey::Source(only.source_id()),
                _ => SubKey::auto(),
            };
            cut_over(queue, key, fanout_fn(destinations)).await;
            true
        }
    }
}
