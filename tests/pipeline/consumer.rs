//! Consumer loop: processing outcomes, commit policy, shutdown.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use opentelemetry::Context;
use order_relay::bus::{BusError, InMemoryQueue, Message, OutboundMessage, Publisher, Subscriber};
use order_relay::{CommitPolicy, ConsumerError, OrderConsumer, ProcessOutcome};
use tokio_util::sync::CancellationToken;

use crate::support::{capture_logs, noop_tracer, propagator, RecordingCaller};

fn order_body(order_id: i64) -> Vec<u8> {
    format!(
        r#"{{"customer_id":"c1","order_id":{order_id},"price":10.5,"created_at":"2024-05-01 12:00:00"}}"#
    )
    .into_bytes()
}

fn consumer(
    queue: &InMemoryQueue,
    caller: &Arc<RecordingCaller>,
) -> OrderConsumer<InMemoryQueue, Arc<RecordingCaller>> {
    OrderConsumer::new(queue.clone(), caller.clone(), noop_tracer(), propagator())
}

/// Run the loop until every published message has been committed, then stop it.
async fn drain(
    consumer: &OrderConsumer<InMemoryQueue, Arc<RecordingCaller>>,
    queue: &InMemoryQueue,
) -> order_relay::ConsumerStats {
    let shutdown = CancellationToken::new();
    let stopper = shutdown.clone();
    let watched = queue.clone();
    let base = Context::new();
    let (stats, ()) = tokio::join!(consumer.run(&base, &shutdown), async move {
        while watched.committed_offset() < watched.len() as i64 {
            tokio::task::yield_now().await;
        }
        stopper.cancel();
    });
    stats.unwrap()
}

#[tokio::test]
async fn undecodable_message_is_committed_without_downstream_call() {
    let (logs, _guard) = capture_logs();
    let queue = InMemoryQueue::default();
    let caller = Arc::new(RecordingCaller::default());
    let consumer = consumer(&queue, &caller);

    queue.publish(OutboundMessage::new(b"garbage".to_vec())).await.unwrap();
    let message = queue.fetch().await.unwrap();

    let outcome = consumer.process_message(&Context::new(), &message).await;
    assert_eq!(outcome, ProcessOutcome::Undecodable);
    assert_eq!(caller.calls(), 0);
    assert!(logs.contents().contains("failed to unmarshal order"));
    assert!(CommitPolicy::Always.should_commit(outcome));
    assert!(CommitPolicy::OnSuccess.should_commit(outcome));
}

#[tokio::test]
async fn loop_commits_undecodable_and_failed_messages() {
    let queue = InMemoryQueue::default();
    let caller = Arc::new(RecordingCaller::failing_first(1));
    let consumer = consumer(&queue, &caller);

    queue.publish(OutboundMessage::new(b"garbage".to_vec())).await.unwrap();
    queue.publish(OutboundMessage::new(order_body(1))).await.unwrap();
    queue.publish(OutboundMessage::new(order_body(2))).await.unwrap();

    let stats = drain(&consumer, &queue).await;

    assert_eq!(stats.fetched, 3);
    assert_eq!(stats.processed, 1);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.committed, 3);
    // Exactly one commit per fetched message, in order.
    assert_eq!(queue.commits(), vec![0, 1, 2]);
    assert_eq!(queue.committed_offset(), 3);
    assert_eq!(caller.calls(), 2);
}

#[tokio::test]
async fn downstream_transport_error_still_commits() {
    let queue = InMemoryQueue::default();
    let caller = Arc::new(RecordingCaller::failing_first(usize::MAX));
    let consumer = consumer(&queue, &caller);

    queue.publish(OutboundMessage::new(order_body(7))).await.unwrap();
    let stats = drain(&consumer, &queue).await;

    assert_eq!(caller.calls(), 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(queue.commits(), vec![0]);
}

/// Subscriber whose read position cannot be moved back.
struct NoRewind(InMemoryQueue);

#[async_trait]
impl Subscriber for NoRewind {
    async fn fetch(&self) -> Result<Message, BusError> {
        self.0.fetch().await
    }

    async fn commit(&self, message: &Message) -> Result<(), BusError> {
        self.0.commit(message).await
    }

    async fn rewind(&self, _message: &Message) -> Result<(), BusError> {
        Err(BusError::Backend("seek not supported".into()))
    }
}

#[tokio::test]
async fn on_success_refetches_a_failed_message() {
    let queue = InMemoryQueue::default();
    let caller = Arc::new(RecordingCaller::failing_first(1));
    let consumer = consumer(&queue, &caller).with_commit_policy(CommitPolicy::OnSuccess);

    queue.publish(OutboundMessage::new(order_body(9))).await.unwrap();
    let stats = drain(&consumer, &queue).await;

    assert_eq!(stats.fetched, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.rewound, 1);
    assert_eq!(stats.processed, 1);
    assert_eq!(stats.committed, 1);
    assert_eq!(queue.commits(), vec![0]);
    assert_eq!(caller.calls(), 2);
}

#[tokio::test]
async fn on_success_never_commits_past_a_failed_message() {
    let queue = InMemoryQueue::default();
    let caller = Arc::new(RecordingCaller::failing_first(1));
    let consumer = consumer(&queue, &caller).with_commit_policy(CommitPolicy::OnSuccess);

    queue.publish(OutboundMessage::new(order_body(1))).await.unwrap();
    queue.publish(OutboundMessage::new(order_body(2))).await.unwrap();
    let stats = drain(&consumer, &queue).await;

    // Offset 0 failed once, was fetched again, and committed before offset 1.
    assert_eq!(queue.commits(), vec![0, 1]);
    assert_eq!(queue.committed_offset(), 2);
    assert_eq!(stats.rewound, 1);
    assert_eq!(caller.calls(), 3);

    // A rejoin resumes after both orders; nothing is left behind.
    queue.reconnect();
    queue.publish(OutboundMessage::new(order_body(3))).await.unwrap();
    assert_eq!(queue.fetch().await.unwrap().offset, 2);
}

#[tokio::test]
async fn on_success_stops_when_rewind_fails() {
    let queue = InMemoryQueue::default();
    let caller = Arc::new(RecordingCaller::failing_first(1));
    let consumer = OrderConsumer::new(NoRewind(queue.clone()), caller.clone(), noop_tracer(), propagator())
        .with_commit_policy(CommitPolicy::OnSuccess);

    queue.publish(OutboundMessage::new(order_body(1))).await.unwrap();
    queue.publish(OutboundMessage::new(order_body(2))).await.unwrap();

    let err = consumer
        .run(&Context::new(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ConsumerError::Rewind { source: BusError::Backend(_), .. }));
    assert_eq!(err.stats().fetched, 1);
    // The second order was never processed, so nothing moved past the first.
    assert!(queue.commits().is_empty());
    assert_eq!(caller.calls(), 1);
}

#[tokio::test]
async fn fetch_failure_is_fatal() {
    let queue = InMemoryQueue::default();
    let caller = Arc::new(RecordingCaller::default());
    let consumer = consumer(&queue, &caller);
    queue.close();

    let err = consumer
        .run(&Context::new(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ConsumerError::Fetch { source: BusError::Closed, .. }));
    assert_eq!(err.stats().fetched, 0);
}

#[tokio::test]
async fn cancellation_stops_an_idle_loop() {
    let queue = InMemoryQueue::default();
    let caller = Arc::new(RecordingCaller::default());
    let consumer = consumer(&queue, &caller);
    let shutdown = CancellationToken::new();

    let stopper = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        stopper.cancel();
    });

    let base = Context::new();
    let stats = tokio::time::timeout(Duration::from_secs(5), consumer.run(&base, &shutdown))
        .await
        .expect("loop did not stop on cancellation")
        .unwrap();
    assert_eq!(stats.fetched, 0);
}

#[tokio::test]
async fn cancelled_before_start_fetches_nothing() {
    let queue = InMemoryQueue::default();
    let caller = Arc::new(RecordingCaller::default());
    let consumer = consumer(&queue, &caller);
    queue.publish(OutboundMessage::new(order_body(1))).await.unwrap();

    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let stats = consumer.run(&Context::new(), &shutdown).await.unwrap();

    assert_eq!(stats.fetched, 0);
    assert_eq!(queue.current_position(), 0);
}
