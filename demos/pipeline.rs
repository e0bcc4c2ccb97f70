//! # Example: pipeline
//!
//! Builds a small forwarding graph: one source siphoned into two shaped
//! destinations, a derived map chain, and a snapshot fork.
//!
//! Demonstrates how to:
//! - Wire a source into several destinations in one [`Channel::siphon`] call
//!   (one cutover, so every destination replays the buffered backlog).
//! - Derive a live-only channel with [`Channel::map`] after the backlog has
//!   been claimed.
//! - Duplicate a backlog with [`Channel::fork`] before any wire claims it.
//!
//! ## Flow
//! ```text
//! source ──► fork ──────► snapshot copy   (backlog only, taken first)
//! source ──► siphon ──┬─► doubles         (×2)
//!                     └─► evens           (filtering transform)
//! source ──► map ─────► labels            (live-only, wired after siphon)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example pipeline
//! ```

use std::sync::Arc;
use std::time::Duration;

use sluice::{Channel, Transform};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let source: Channel<i64> = Channel::new();
    source.enqueue_all(vec![1, 2]).await;

    // 1. Fork first: the copy holds the buffered [1, 2] and nothing after
    let snapshot = source.fork().await;

    // 2. Siphon into two destinations in one call; both replay the backlog
    let doubles: Channel<i64> = Channel::new();
    let evens: Channel<i64> = Channel::new();
    let double: Transform<i64, i64> = Arc::new(|batch| batch.iter().map(|v| v * 2).collect());
    let keep_even: Transform<i64, i64> =
        Arc::new(|batch| batch.iter().filter(|v| *v % 2 == 0).copied().collect());
    assert!(
        source
            .siphon(vec![(doubles.clone(), double), (evens.clone(), keep_even)])
            .await
    );

    // 3. Derive a live-only chain (the backlog is already claimed)
    let labels = source.map(|v| format!("msg-{v}")).await;

    // 4. Keep producing: wires and derived channels follow, the fork does not
    source.enqueue_all(vec![3, 4, 5]).await;
    source.close();

    let zero = Some(Duration::ZERO);
    println!("doubles  = {:?}", doubles.drain(zero).await);
    println!("evens    = {:?}", evens.drain(zero).await);
    println!("labels   = {:?}", labels.drain(zero).await);
    println!("snapshot = {:?}", snapshot.drain(zero).await);
}
