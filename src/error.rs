//! Error types surfaced by blocking channel operations.
//!
//! The composition operations (`receive_all`, `siphon`, `fork`) never raise:
//! "channel already closed" is a normal transient state in a multi-producer
//! system, so they report success or failure through their `bool` / handle
//! return values. Only the strictly blocking, single-result
//! [`wait_for_message`](crate::Channel::wait_for_message) returns a typed
//! error, because it has no other way to report that nothing arrived.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by blocking channel consumption.
///
/// The two variants are deliberately distinguishable: callers typically retry
/// or extend the deadline on [`ChannelError::TimedOut`], while
/// [`ChannelError::Closed`] is terminal for the channel.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ChannelError {
    /// No message arrived within the wait deadline.
    #[error("no message within {timeout:?}")]
    TimedOut {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The channel is closed and its backlog is exhausted.
    #[error("channel closed")]
    Closed,
}

impl ChannelError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use sluice::ChannelError;
    /// use std::time::Duration;
    ///
    /// let err = ChannelError::TimedOut { timeout: Duration::from_millis(50) };
    /// assert_eq!(err.as_label(), "wait_timed_out");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ChannelError::TimedOut { .. } => "wait_timed_out",
            ChannelError::Closed => "channel_closed",
        }
    }

    /// Indicates whether the wait may succeed if retried with a new deadline.
    ///
    /// Returns `true` for [`ChannelError::TimedOut`], `false` for
    /// [`ChannelError::Closed`].
    ///
    /// # Example
    /// ```
    /// use sluice::ChannelError;
    /// use std::time::Duration;
    ///
    /// let timed_out = ChannelError::TimedOut { timeout: Duration::from_millis(50) };
    /// assert!(timed_out.is_retryable());
    ///
    /// assert!(!ChannelError::Closed.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChannelError::TimedOut { .. })
    }
}
