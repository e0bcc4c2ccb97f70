//! # Example: timed_wait
//!
//! Blocking consumption: a single-message wait that times out, a wait that
//! succeeds mid-window, and a budgeted bulk drain.
//!
//! Demonstrates how to:
//! - Branch on [`ChannelError::TimedOut`] from
//!   [`Channel::wait_for_message`].
//! - Collect everything a producer manages to send within a wall-clock
//!   budget using [`Channel::drain`].
//!
//! ## Run
//! ```bash
//! cargo run --example timed_wait
//! ```

use std::time::Duration;

use sluice::{Channel, ChannelError};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let ch: Channel<u32> = Channel::new();

    // 1. Nothing is coming: the wait fails with a distinguishable timeout
    match ch.wait_for_message(Some(Duration::from_millis(50))).await {
        Err(ChannelError::TimedOut { timeout }) => println!("nothing within {timeout:?}"),
        other => println!("unexpected: {other:?}"),
    }

    // 2. A producer shows up mid-wait: the message is returned, no failure
    let producer = {
        let ch = ch.clone();
        tokio::spawn(async move {
            for n in 1..=5 {
                tokio::time::sleep(Duration::from_millis(20)).await;
                ch.enqueue(n).await;
            }
            ch.close();
        })
    };

    match ch.wait_for_message(Some(Duration::from_millis(500))).await {
        Ok(msg) => println!("got {msg}"),
        Err(err) => println!("wait failed: {}", err.as_label()),
    }

    // 3. Drain whatever else arrives until the channel closes
    let rest = ch.drain(None).await;
    println!("drained {rest:?}");

    producer.await.expect("producer panicked");
}
