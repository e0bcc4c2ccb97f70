//! Blocking and lazy consumption utilities.
//!
//! ## Contents
//! - [`PollOutcome`] and the poll primitive (message / timed-out / closed)
//! - [`PullBudget`] and the lazy pull-driven stream
//! - bulk drain and the single-message wait
//!
//! All of these suspend only the calling task; the distributor's broadcast
//! path and unrelated channels are never blocked by a waiting consumer.

mod poll;
mod stream;
mod wait;

pub use poll::PollOutcome;
pub use stream::PullBudget;

pub(crate) use poll::poll_message;
pub(crate) use stream::{drain, stream};
pub(crate) use wait::wait_for_message;
