//! # Single-message wait.
//!
//! The one blocking operation that reports through a typed error: it has a
//! single result slot and no other way to say "nothing arrived".

use std::time::Duration;

use crate::channel::Channel;
use crate::consume::poll::{poll_message, PollOutcome};
use crate::error::ChannelError;

pub(crate) async fn wait_for_message<T>(
    channel: &Channel<T>,
    timeout: Option<Duration>,
) -> Result<T, ChannelError>
where
    T: Clone + Send + Sync + 'static,
{
    // fast path: claim straight from the backlog, no wait machinery
    if let Some(msg) = channel.try_dequeue().await {
        return Ok(msg);
    }
    match poll_message(channel, timeout).await {
        PollOutcome::Message(msg) => Ok(msg),
        PollOutcome::TimedOut => Err(ChannelError::TimedOut {
            timeout: timeout.unwrap_or_default(),
        }),
        PollOutcome::Closed => Err(ChannelError::Closed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_buffered_message_immediately() {
        let ch: Channel<i32> = Channel::new();
        ch.enqueue(1).await;
        assert_eq!(ch.wait_for_message(None).await.ok(), Some(1));
    }

    #[tokio::test]
    async fn test_quiet_channel_times_out() {
        let ch: Channel<i32> = Channel::new();
        let err = ch
            .wait_for_message(Some(Duration::from_millis(50)))
            .await
            .expect_err("nothing was enqueued");
        assert!(matches!(err, ChannelError::TimedOut { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_message_arriving_within_the_window_is_returned() {
        let ch: Channel<i32> = Channel::new();
        let producer = {
            let ch = ch.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                ch.enqueue(9).await;
            })
        };

        let msg = ch.wait_for_message(Some(Duration::from_millis(500))).await;
        producer.await.expect("producer panicked");
        assert_eq!(msg.ok(), Some(9));
    }

    #[tokio::test]
    async fn test_closed_is_distinct_from_timed_out() {
        let ch: Channel<i32> = Channel::new();
        ch.close();

        let err = ch
            .wait_for_message(Some(Duration::from_millis(50)))
            .await
            .expect_err("channel is closed");
        assert!(matches!(err, ChannelError::Closed));
        assert_eq!(err.as_label(), "channel_closed");
    }
}
