//! # Lazy stream and bulk drain.
//!
//! The stream is pull-driven: one demanded element is one bounded poll
//! against the channel, and nothing is polled ahead of demand. The drain is
//! the eager complement — it collects the stream under a shrinking absolute
//! deadline.
//!
//! ## Rules
//! - A pull that times out, or finds the channel closed and drained, ends
//!   the stream; it is finite and not restartable.
//! - Abandoning the stream early is safe: `take(k)` performs exactly `k`
//!   pulls and later messages stay in the backlog.
//! - A constant channel's stream yields its single value once, then ends.

use std::time::Duration;

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use tokio::time::Instant;

use crate::channel::Channel;
use crate::consume::poll::{poll_message, PollOutcome};

/// Wait budget applied to each pull of the stream.
#[derive(Clone, Copy, Debug)]
pub enum PullBudget {
    /// No limit: each pull waits until a message arrives or the channel
    /// closes.
    Unbounded,
    /// Fixed budget per pull.
    PerPull(Duration),
    /// Absolute deadline shared by all pulls; the remaining window is
    /// recomputed before every pull.
    Deadline(Instant),
}

impl PullBudget {
    /// Budget expiring `budget` from now, shared across pulls.
    pub fn deadline_in(budget: Duration) -> Self {
        PullBudget::Deadline(Instant::now() + budget)
    }

    /// The wait allowed for the next pull (`None` = no limit).
    fn pull_timeout(&self) -> Option<Duration> {
        match self {
            PullBudget::Unbounded => None,
            PullBudget::PerPull(d) => Some(*d),
            PullBudget::Deadline(at) => Some(at.saturating_duration_since(Instant::now())),
        }
    }
}

pub(crate) fn stream<T>(channel: Channel<T>, budget: PullBudget) -> BoxStream<'static, T>
where
    T: Clone + Send + Sync + 'static,
{
    stream::unfold((channel, budget, false), |(channel, budget, done)| async move {
        if done {
            return None;
        }
        match poll_message(&channel, budget.pull_timeout()).await {
            PollOutcome::Message(msg) => {
                // constant channels deliver once per consumer, then end
                let done = channel.is_constant();
                Some((msg, (channel, budget, done)))
            }
            PollOutcome::TimedOut | PollOutcome::Closed => None,
        }
    })
    .boxed()
}

pub(crate) async fn drain<T>(channel: &Channel<T>, budget: Option<Duration>) -> Vec<T>
where
    T: Clone + Send + Sync + 'static,
{
    let pull = match budget {
        Some(window) => PullBudget::deadline_in(window),
        None => PullBudget::Unbounded,
    };
    stream(channel.clone(), pull).collect().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_take_pulls_exactly_what_is_demanded() {
        let ch: Channel<i32> = Channel::new();
        ch.enqueue_all(vec![1, 2, 3]).await;

        let mut first_only = ch.stream(PullBudget::Unbounded).take(1);
        assert_eq!(first_only.next().await, Some(1));
        drop(first_only);

        // later elements were never pulled out of the backlog
        assert_eq!(ch.try_dequeue().await, Some(2));
        assert_eq!(ch.try_dequeue().await, Some(3));
    }

    #[tokio::test]
    async fn test_stream_ends_when_the_pull_budget_expires() {
        let ch: Channel<i32> = Channel::new();
        ch.enqueue_all(vec![1, 2]).await;

        let collected: Vec<i32> = ch.stream(PullBudget::PerPull(Duration::from_millis(20))).collect().await;
        assert_eq!(collected, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_stream_ends_on_close() {
        let ch: Channel<i32> = Channel::new();
        ch.enqueue(1).await;

        let consumer = {
            let ch = ch.clone();
            tokio::spawn(async move { ch.stream(PullBudget::Unbounded).collect::<Vec<i32>>().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        ch.enqueue(2).await;
        ch.close();

        assert_eq!(consumer.await.expect("consumer panicked"), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_drain_with_zero_budget_takes_only_whats_ready() {
        let ch: Channel<i32> = Channel::new();
        ch.enqueue_all(vec![1, 2, 3]).await;

        assert_eq!(ch.drain(Some(Duration::ZERO)).await, vec![1, 2, 3]);
        assert!(ch.drain(Some(Duration::ZERO)).await.is_empty());
    }

    #[tokio::test]
    async fn test_drain_budget_collects_messages_arriving_in_the_window() {
        let ch: Channel<i32> = Channel::new();
        ch.enqueue(1).await;

        let producer = {
            let ch = ch.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(15)).await;
                ch.enqueue(2).await;
            })
        };

        let collected = ch.drain(Some(Duration::from_millis(120))).await;
        producer.await.expect("producer panicked");
        assert_eq!(collected, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_constant_stream_yields_the_value_once() {
        let ch: Channel<i32> = Channel::constant(5);
        let collected: Vec<i32> = ch.stream(PullBudget::Unbounded).collect().await;
        assert_eq!(collected, vec![5]);
    }
}
