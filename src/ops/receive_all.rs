//! # receive_all - permanent listeners over past and future messages.
//!
//! Registers receivers for everything a channel ever carries: the buffered
//! backlog is replayed first, then live batches follow, with the cutover
//! gate guaranteeing the seam is exactly-once and in order.
//!
//! ## Rules
//! - Closed channels register nothing and report `false`; callers poll any
//!   remaining backlog themselves.
//! - Constant channels bypass the protocol: each receiver observes the
//!   single value directly (now, or when it is set).
//! - Per batch, receivers run in registration order.

use std::sync::Arc;

use crate::channel::{Channel, Delivery, ReceiveRef};
use crate::cutover::cut_over;
use crate::queue::{Batch, BatchFn, SubKey};

/// Wraps one receiver as a distributor callback.
pub(crate) fn receiver_fn<T>(receiver: ReceiveRef<T>) -> BatchFn<T>
where
    T: Clone + Send + Sync + 'static,
{
    Arc::new(move |batch: Batch<T>| {
        let receiver = receiver.clone();
        Box::pin(async move { receiver.on_batch(&batch).await })
    })
}

/// Fans one batch out to every receiver, in registration order.
fn broadcast_fn<T>(receivers: Vec<ReceiveRef<T>>) -> BatchFn<T>
where
    T: Clone + Send + Sync + 'static,
{
    let receivers = Arc::new(receivers);
    Arc::new(move |batch: Batch<T>| {
        let receivers = receivers.clone();
        Box::pin(async move {
            for receiver in receivers.iter() {
                receiver.on_batch(&batch).await;
            }
        })
    })
}

pub(crate) async fn receive_all<T>(channel: &Channel<T>, receivers: Vec<ReceiveRef<T>>) -> bool
where
    T: Clone + Send + Sync + 'static,
{
    if receivers.is_empty() {
        // nothing to register; report the channel's state without touching it
        return !channel.is_closed();
    }
    match channel.delivery() {
        Delivery::Closed => false,
        Delivery::Constant(cell) => {
            for receiver in receivers {
                cell.deliver(receiver_fn(receiver)).await;
            }
            true
        }
        Delivery::Live(queue) => {
            cut_over(queue, SubKey::auto(), broadcast_fn(receivers)).await;
            true
        }
    }
}
