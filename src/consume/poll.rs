//! # Poll primitive - one bounded wait for one message.
//!
//! [`poll_message`] is the lower-level primitive behind
//! [`wait_for_message`](crate::Channel::wait_for_message) and the lazy
//! stream: try the backlog, then suspend until an arrival, the close signal,
//! or the deadline, and try again.
//!
//! ## Rules
//! - **Fast path first**: a non-empty backlog returns without suspending.
//! - **Close drains**: a closed channel keeps returning buffered messages
//!   until the backlog is empty; only then does it report `Closed`.
//! - **No lost wakeups**: interest in arrivals is registered before the
//!   backlog is re-checked, so a message landing between the check and the
//!   suspension still wakes the poller.
//! - **Stolen wakeups loop**: another consumer may win the message that woke
//!   us; the poll re-arms with the remaining deadline.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant};

use crate::channel::{Body, Channel, ConstantCell};
use crate::queue::Queue;

/// Outcome of one bounded poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// A message was claimed by this poller.
    Message(T),
    /// The deadline elapsed with nothing claimed.
    TimedOut,
    /// The channel is closed and its backlog is exhausted.
    Closed,
}

impl<T> PollOutcome<T> {
    /// Returns the message, discarding the outcome context.
    pub fn into_message(self) -> Option<T> {
        match self {
            PollOutcome::Message(msg) => Some(msg),
            _ => None,
        }
    }
}

pub(crate) async fn poll_message<T>(channel: &Channel<T>, timeout: Option<Duration>) -> PollOutcome<T>
where
    T: Clone + Send + Sync + 'static,
{
    let deadline = timeout.map(|d| Instant::now() + d);
    match channel.body() {
        Body::Conduit(queue) => poll_conduit(channel, queue, deadline).await,
        Body::Constant(cell) => poll_constant(channel, cell, deadline).await,
    }
}

async fn poll_conduit<T>(
    channel: &Channel<T>,
    queue: &Arc<Queue<T>>,
    deadline: Option<Instant>,
) -> PollOutcome<T>
where
    T: Clone + Send + Sync + 'static,
{
    loop {
        if let Some(msg) = queue.dequeue().await {
            return PollOutcome::Message(msg);
        }
        if channel.is_closed() {
            return PollOutcome::Closed;
        }

        let arrival = queue.arrivals().notified();
        tokio::pin!(arrival);
        arrival.as_mut().enable();
        // a message may have landed between the dequeue and the registration
        if let Some(msg) = queue.dequeue().await {
            return PollOutcome::Message(msg);
        }

        match deadline {
            Some(at) => tokio::select! {
                _ = &mut arrival => {}
                _ = channel.closed_token().cancelled() => {}
                _ = time::sleep_until(at) => return PollOutcome::TimedOut,
            },
            None => tokio::select! {
                _ = &mut arrival => {}
                _ = channel.closed_token().cancelled() => {}
            },
        }
    }
}

async fn poll_constant<T>(
    channel: &Channel<T>,
    cell: &ConstantCell<T>,
    deadline: Option<Instant>,
) -> PollOutcome<T>
where
    T: Clone + Send + Sync + 'static,
{
    loop {
        if let Some(value) = cell.get().await {
            return PollOutcome::Message(value);
        }
        if channel.is_closed() {
            return PollOutcome::Closed;
        }

        let set = cell.set_signal().notified();
        tokio::pin!(set);
        set.as_mut().enable();
        if let Some(value) = cell.get().await {
            return PollOutcome::Message(value);
        }

        match deadline {
            Some(at) => tokio::select! {
                _ = &mut set => {}
                _ = channel.closed_token().cancelled() => {}
                _ = time::sleep_until(at) => return PollOutcome::TimedOut,
            },
            None => tokio::select! {
                _ = &mut set => {}
                _ = channel.closed_token().cancelled() => {}
            },
        }
    }
}
