//! # map / filter - derived single-transform channels.
//!
//! Thin wrappers over [`siphon`](crate::ops::siphon): one fresh output
//! channel, one element-wise transform, per-batch grouping preserved. A
//! closed source yields a closed (empty) derived channel.

use std::sync::Arc;

use crate::channel::Channel;
use crate::ops::siphon;
use crate::queue::Transform;

pub(crate) async fn map<T, U, F>(source: &Channel<T>, f: F) -> Channel<U>
where
    T: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
    F: Fn(&T) -> U + Send + Sync + 'static,
{
    let out = Channel::new();
    let transform: Transform<T, U> = Arc::new(move |batch| batch.iter().map(|msg| f(msg)).collect());
    if !siphon(source, vec![(out.clone(), transform)]).await {
        out.close();
    }
    out
}

pub(crate) async fn filter<T, F>(source: &Channel<T>, pred: F) -> Channel<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    let out = Channel::new();
    let transform: Transform<T, T> =
        Arc::new(move |batch| batch.iter().filter(|msg| pred(msg)).cloned().collect());
    if !siphon(source, vec![(out.clone(), transform)]).await {
        out.close();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_map_covers_backlog_and_live() {
        let ch: Channel<i32> = Channel::new();
        ch.enqueue_all(vec![1, 2]).await;

        let bumped = ch.map(|v| v + 1).await;
        ch.enqueue(3).await;

        assert_eq!(bumped.drain(Some(Duration::ZERO)).await, vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_filter_keeps_only_accepted_messages() {
        let ch: Channel<i32> = Channel::new();
        ch.enqueue_all(vec![1, 2, 3, 4]).await;

        let evens = ch.filter(|v| v % 2 == 0).await;
        assert_eq!(evens.drain(Some(Duration::ZERO)).await, vec![2, 4]);
    }

    #[tokio::test]
    async fn test_map_chain_composes() {
        let ch: Channel<i32> = Channel::new();
        ch.enqueue_all(vec![1, 2, 3]).await;

        let strings = ch.map(|v| v * 10).await.map(|v| v.to_string()).await;
        assert_eq!(
            strings.drain(Some(Duration::ZERO)).await,
            vec!["10".to_string(), "20".to_string(), "30".to_string()]
        );
    }

    #[tokio::test]
    async fn test_derived_channel_of_closed_source_is_closed() {
        let ch: Channel<i32> = Channel::new();
        ch.close();

        let derived = ch.map(|v| v + 1).await;
        assert!(derived.is_closed());
        assert!(derived.drain(Some(Duration::ZERO)).await.is_empty());
    }
}
