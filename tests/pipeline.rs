//! End-to-end conduit tests: produce → cutover → compose → consume.
//!
//! Exercises whole message paths through the public API, with real
//! concurrent producers crossing the backlog-to-live transition.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use sluice::{Channel, ChannelError, ReceiveFn, ReceiveRef, Transform};

fn collector<T: Clone + Send + Sync + 'static>(
    log: Arc<Mutex<Vec<T>>>,
) -> ReceiveRef<T> {
    ReceiveFn::arc("collector", move |batch: Vec<T>| {
        let log = log.clone();
        async move {
            log.lock().await.extend(batch);
        }
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_loss_when_registration_races_a_producer() {
    for _ in 0..10 {
        let ch: Channel<u32> = Channel::new();
        for n in 0..100 {
            ch.enqueue(n).await;
        }

        let producer = {
            let ch = ch.clone();
            tokio::spawn(async move {
                for n in 100..200 {
                    ch.enqueue(n).await;
                    if n % 16 == 0 {
                        tokio::time::sleep(Duration::from_micros(30)).await;
                    }
                }
            })
        };

        let log = Arc::new(Mutex::new(Vec::new()));
        assert!(ch.receive_all(vec![collector(log.clone())]).await);
        producer.await.expect("producer panicked");

        let seen = log.lock().await.clone();
        assert_eq!(seen.len(), 200, "message lost or duplicated across the cutover");
        assert_eq!(seen, (0..200).collect::<Vec<u32>>(), "messages reordered");
    }
}

#[tokio::test]
async fn test_forwarding_graph_end_to_end() {
    let source: Channel<i64> = Channel::new();
    source.enqueue_all(vec![1, 2]).await;

    // a fork taken now copies the buffered [1, 2] and nothing after
    let snapshot = source.fork().await;

    // first registration claims the backlog: labels sees [1, 2] plus live
    let labels: Channel<String> = Channel::new();
    let label: Transform<i64, String> =
        Arc::new(|batch| batch.iter().map(|v| format!("msg-{v}")).collect());
    assert!(source.siphon(vec![(labels.clone(), label)]).await);

    // derived later: the backlog is already claimed, so live-only
    let squares = source.filter(|v| v % 2 == 0).await.map(|v| v * v).await;

    source.enqueue_all(vec![3, 4, 5]).await;

    let zero = Some(Duration::ZERO);
    assert_eq!(
        labels.drain(zero).await,
        (1..=5).map(|v| format!("msg-{v}")).collect::<Vec<String>>()
    );
    assert_eq!(squares.drain(zero).await, vec![16]);
    assert_eq!(snapshot.drain(zero).await, vec![1, 2]);
}

#[tokio::test]
async fn test_fork_before_any_subscription_copies_the_backlog() {
    let ch: Channel<i64> = Channel::new();
    ch.enqueue_all(vec![10, 20, 30]).await;

    let forks = ch.fork_n(2).await;
    ch.enqueue(40).await;

    let zero = Some(Duration::ZERO);
    assert_eq!(forks[0].drain(zero).await, vec![10, 20, 30]);
    assert_eq!(forks[1].drain(zero).await, vec![10, 20, 30]);
    assert_eq!(ch.drain(zero).await, vec![10, 20, 30, 40]);
}

#[tokio::test]
async fn test_second_registration_follows_from_its_own_seam() {
    let ch: Channel<u32> = Channel::new();
    ch.enqueue(1).await;

    let first = Arc::new(Mutex::new(Vec::new()));
    assert!(ch.receive_all(vec![collector(first.clone())]).await);

    // the first registration consumed the backlog; a later one starts from
    // its own registration point
    let second = Arc::new(Mutex::new(Vec::new()));
    assert!(ch.receive_all(vec![collector(second.clone())]).await);

    ch.enqueue(2).await;
    ch.enqueue(3).await;

    assert_eq!(*first.lock().await, vec![1, 2, 3]);
    assert_eq!(*second.lock().await, vec![2, 3]);
}

#[tokio::test]
async fn test_blocking_wait_then_budgeted_drain() {
    let ch: Channel<u32> = Channel::new();

    let err = ch
        .wait_for_message(Some(Duration::from_millis(40)))
        .await
        .expect_err("nothing was produced yet");
    assert!(matches!(err, ChannelError::TimedOut { .. }));

    let producer = {
        let ch = ch.clone();
        tokio::spawn(async move {
            for n in 1..=3 {
                tokio::time::sleep(Duration::from_millis(10)).await;
                ch.enqueue(n).await;
            }
            ch.close();
        })
    };

    let first = ch.wait_for_message(Some(Duration::from_millis(500))).await;
    assert_eq!(first.ok(), Some(1));

    // unlimited budget: runs until the close
    let rest = ch.drain(None).await;
    assert_eq!(rest, vec![2, 3]);

    producer.await.expect("producer panicked");

    let err = ch.wait_for_message(None).await.expect_err("closed and drained");
    assert!(matches!(err, ChannelError::Closed));
}

#[tokio::test]
async fn test_closed_channel_refuses_every_registration() {
    let ch: Channel<u32> = Channel::new();
    ch.enqueue(1).await;
    ch.close();

    let log = Arc::new(Mutex::new(Vec::new()));
    assert!(!ch.receive_all(vec![collector(log.clone())]).await);

    let dest: Channel<u32> = Channel::new();
    let identity: Transform<u32, u32> = Arc::new(|batch| batch.to_vec());
    assert!(!ch.siphon(vec![(dest.clone(), identity)]).await);

    let fork = ch.fork().await;
    assert!(fork.is_closed());

    assert!(log.lock().await.is_empty());
    assert!(dest.drain(Some(Duration::ZERO)).await.is_empty());

    // the backlog remains directly pollable after the refusals
    assert_eq!(ch.try_dequeue().await, Some(1));
}

#[tokio::test]
async fn test_constant_channel_through_the_composition_ops() {
    let constant: Channel<u32> = Channel::constant(7);

    let log = Arc::new(Mutex::new(Vec::new()));
    assert!(constant.receive_all(vec![collector(log.clone())]).await);
    assert_eq!(*log.lock().await, vec![7]);

    let tripled = constant.map(|v| v * 3).await;
    assert_eq!(tripled.drain(Some(Duration::ZERO)).await, vec![21]);

    let fork = constant.fork().await;
    assert!(fork.is_constant());
    assert_eq!(fork.wait_for_message(None).await.ok(), Some(7));
}
