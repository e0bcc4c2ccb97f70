//! # fork - snapshot duplication of a channel's backlog.
//!
//! Forking copies the current backlog into independent read-only channels;
//! unlike [`siphon`](crate::ops::siphon), forks do not follow future
//! messages. Consuming one fork never affects another, or the source.

use std::sync::Arc;

use crate::channel::{Channel, Delivery};
use crate::queue::Transform;

/// The per-copy transform `fork` uses for every output.
fn identity<T: Clone>() -> Transform<T, T> {
    Arc::new(|batch| batch.to_vec())
}

pub(crate) async fn fork_n<T>(channel: &Channel<T>, n: usize) -> Vec<Channel<T>>
where
    T: Clone + Send + Sync + 'static,
{
    match channel.delivery() {
        // fixed, already-determined content: nothing to copy
        Delivery::Closed | Delivery::Constant(_) => (0..n).map(|_| channel.clone()).collect(),
        Delivery::Live(queue) => {
            let transforms: Vec<Transform<T, T>> = (0..n).map(|_| identity()).collect();
            queue
                .copy(&transforms)
                .await
                .into_iter()
                .map(Channel::from_queue)
                .collect()
        }
    }
}
