use std::time::Duration;

use futures::StreamExt;
use movies_service::{BroadcastStream, DemandConsumer, Retention};

#[tokio::test]
async fn test_late_subscriber_replay_then_live_in_order() {
    let stream = BroadcastStream::new(Retention::ReplayAll);
    stream.publish("a");
    stream.publish("b");

    let mut subscription = stream.subscribe();
    subscription.request(3);
    stream.publish("c");
    stream.publish("d");

    assert_eq!(subscription.next().await, Some("a"));
    assert_eq!(subscription.next().await, Some("b"));
    assert_eq!(subscription.next().await, Some("c"));
    assert_eq!(subscription.try_next(), None);

    subscription.request(1);
    assert_eq!(subscription.next().await, Some("d"));
}

#[tokio::test]
async fn test_replay_latest_gives_only_most_recent() {
    let stream = BroadcastStream::new(Retention::ReplayLatest);
    for i in 1..=3 {
        stream.publish(i);
    }

    let mut subscription = stream.subscribe();
    subscription.request(10);
    stream.publish(4);

    assert_eq!(subscription.next().await, Some(3));
    assert_eq!(subscription.next().await, Some(4));
    assert_eq!(stream.history_len(), 1);
}

#[tokio::test]
async fn test_slow_subscriber_does_not_hold_back_others() {
    let stream = BroadcastStream::new(Retention::ReplayAll);
    let mut slow = stream.subscribe();
    let mut fast = stream.subscribe();
    fast.request(u64::MAX);

    for i in 0..100 {
        stream.publish(i);
    }

    let received: Vec<_> = (&mut fast).take(100).collect().await;
    assert_eq!(received, (0..100).collect::<Vec<_>>());
    assert_eq!(slow.try_next(), None);

    slow.request(1);
    assert_eq!(slow.next().await, Some(0));
}

#[tokio::test]
async fn test_cancelled_subscriber_leaves_others_running() {
    let stream = BroadcastStream::new(Retention::ReplayAll);
    let cancelled = stream.subscribe();
    let mut kept = stream.subscribe();
    kept.request(2);
    assert_eq!(stream.subscriber_count(), 2);

    cancelled.cancel();
    assert_eq!(stream.subscriber_count(), 1);

    stream.publish("x");
    stream.publish("y");
    assert_eq!(kept.next().await, Some("x"));
    assert_eq!(kept.next().await, Some("y"));
}

#[tokio::test]
async fn test_demand_consumer_with_concurrent_producer() {
    let stream = BroadcastStream::new(Retention::ReplayAll);
    let consumer = DemandConsumer::new(stream.subscribe(), 4);

    let producer = {
        let stream = stream.clone();
        tokio::spawn(async move {
            for i in 0..50u32 {
                stream.publish(i);
                if i % 7 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        })
    };

    let items: Vec<u32> = tokio::time::timeout(
        Duration::from_secs(5),
        consumer.into_stream().take(50).collect(),
    )
    .await
    .unwrap();
    producer.await.unwrap();

    assert_eq!(items, (0..50).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_publishers_from_many_tasks_reach_every_subscriber() {
    let stream = BroadcastStream::new(Retention::ReplayAll);
    let mut first = stream.subscribe();
    let mut second = stream.subscribe();
    first.request(u64::MAX);
    second.request(u64::MAX);

    let mut handles = Vec::new();
    for task in 0..4u32 {
        let stream = stream.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25u32 {
                stream.publish(task * 100 + i);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let first_items: Vec<_> = (&mut first).take(100).collect().await;
    let second_items: Vec<_> = (&mut second).take(100).collect().await;

    assert_eq!(first_items, second_items);
    for task in 0..4u32 {
        let from_task: Vec<_> = first_items
            .iter()
            .copied()
            .filter(|item| item / 100 == task)
            .collect();
        assert_eq!(from_task, (0..25).map(|i| task * 100 + i).collect::<Vec<_>>());
    }
}
