//! # Example: fan_out
//!
//! Buffers a backlog, then registers two receivers that both see the full
//! history followed by live messages.
//!
//! Demonstrates how to:
//! - Enqueue while nobody is listening (messages buffer in the backlog).
//! - Register receivers with [`Channel::receive_all`] across the cutover.
//! - Use the feature-gated [`LogTap`] printer alongside a custom receiver.
//!
//! ## Flow
//! ```text
//! enqueue 1..=3 ──► backlog
//! receive_all(LogTap, counter)
//!     ├─► replay [1, 2, 3] to both receivers
//!     └─► flip to live delivery
//! enqueue 4..=5 ──► pushed straight to both receivers
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example fan_out --features logging
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use sluice::{Channel, LogTap, ReceiveFn, ReceiveRef};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let ch: Channel<u64> = Channel::new();

    // 1. Produce before anybody listens: these buffer in the backlog
    for n in 1..=3 {
        ch.enqueue(n).await;
    }

    // 2. Build receivers: the built-in printer plus a counting closure
    let seen = Arc::new(AtomicU64::new(0));
    let counter: ReceiveRef<u64> = {
        let seen = seen.clone();
        ReceiveFn::arc("counter", move |batch: Vec<u64>| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(batch.len() as u64, Ordering::Relaxed);
            }
        })
    };
    let receivers: Vec<ReceiveRef<u64>> = vec![Arc::new(LogTap::new("fan-out")), counter];

    // 3. Register: the backlog replays first, then delivery goes live
    assert!(ch.receive_all(receivers).await);

    // 4. Produce after registration: pushed synchronously to both receivers
    for n in 4..=5 {
        ch.enqueue(n).await;
    }

    println!("counter saw {} messages", seen.load(Ordering::Relaxed));
}
