//! # sluice
//!
//! **Sluice** is an in-memory single-producer/multi-consumer message conduit
//! for Rust.
//!
//! A channel buffers messages in a backlog while nobody is listening and
//! pushes them to registered receivers once somebody is. The crate's core is
//! the cutover protocol that moves a channel between those two modes without
//! losing, duplicating, or reordering a single message — even while
//! producers keep enqueuing through the transition.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  producers                       one Channel                    consumers
//!     │                                                              │
//!     ▼                                                              │
//!  enqueue ──► Queue ──┬── backlog (nobody live) ──► try_dequeue ────┤
//!                      │                             poll_message    │
//!                      │                             wait/stream     │
//!                      │                             drain           │
//!                      │                                             │
//!                      └── Distributor (live) ──► receive_all ───────┤
//!                                             ──► siphon ──► Channel │
//!                                             ──► map / filter ──► Channel
//!
//!  backlog ──► live transition (per registration):
//!
//!     establish ──► subscribe gate-wrapped handler   (batches park while Pending)
//!     lock monitor                                   (ordering barrier)
//!     activate  ──► drain backlog ++ parked, flip latch   (one critical section)
//!     replay    ──► handler(snapshot)                (monitor still held)
//!     unlock    ──► first live batch may now reach the handler
//! ```
//!
//! ### Delivery variants
//! Every public operation resolves the channel's variant once per call:
//! **Closed** (terminal; registrations report `false`), **Constant**
//! (single-value, exempt from the protocol), **Live** (regular conduit).
//!
//! ## Features
//! | Area            | Description                                                  | Key types / traits               |
//! |-----------------|--------------------------------------------------------------|----------------------------------|
//! | **Channels**    | Unbounded FIFO conduits, constant channels, close semantics. | [`Channel`], [`ChannelConfig`]   |
//! | **Receiving**   | Full-history registration across the cutover seam.           | [`Receive`], [`ReceiveFn`]       |
//! | **Composition** | Forwarding wires, snapshot forks, derived channels.          | [`Transform`]                    |
//! | **Consumption** | Poll, single-message wait, lazy stream, bulk drain.          | [`PollOutcome`], [`PullBudget`]  |
//! | **Errors**      | Typed failure for the blocking wait.                         | [`ChannelError`]                 |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogTap`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use sluice::{Channel, ReceiveFn, ReceiveRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let ch: Channel<i64> = Channel::new();
//!
//!     // messages buffer while nobody listens
//!     ch.enqueue_all(vec![1, 2, 3]).await;
//!
//!     // a derived channel sees the backlog and everything after it
//!     let even_squares = ch.filter(|v| v % 2 == 0).await.map(|v| v * v).await;
//!
//!     // registering a receiver replays history, then follows live
//!     let printer: ReceiveRef<i64> = ReceiveFn::arc("printer", |batch: Vec<i64>| async move {
//!         println!("got {batch:?}");
//!     });
//!     assert!(ch.receive_all(vec![printer]).await);
//!
//!     ch.enqueue(4).await;
//!     ch.close();
//!
//!     assert_eq!(even_squares.drain(Some(Duration::ZERO)).await, vec![4, 16]);
//! }
//! ```

mod channel;
mod consume;
mod cutover;
mod error;
mod ops;
mod queue;

// ---- Public re-exports ----

pub use channel::{Channel, ChannelConfig, Receive, ReceiveFn, ReceiveRef};
pub use consume::{PollOutcome, PullBudget};
pub use error::ChannelError;
pub use queue::Transform;

// Optional: expose a simple built-in batch printer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
mod logging;
#[cfg(feature = "logging")]
pub use logging::LogTap;
