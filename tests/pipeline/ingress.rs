//! Ingress handler: validate, persist, publish.

use std::sync::atomic::Ordering;

use opentelemetry::Context;
use order_relay::bus::InMemoryQueue;
use order_relay::order::{OrderMessage, OrderPublisher, WIRE_DATE_TIME_FORMAT};
use order_relay::{Fault, IngressError, OrderService};

use crate::support::{in_memory_service, noop_tracer, propagator, FixedIdRepository, UnavailableRepository};

#[tokio::test]
async fn published_order_carries_persistence_id() {
    let queue = InMemoryQueue::default();
    let publisher = OrderPublisher::new(queue.clone(), noop_tracer(), propagator());
    let service = OrderService::new(FixedIdRepository::new(42), publisher, noop_tracer());

    let order = service
        .create_order(&Context::new(), br#"{"customer_id":"c1","price":10.5}"#)
        .await
        .unwrap();
    assert_eq!(order.order_id.get(), 42);

    let messages = queue.messages();
    assert_eq!(messages.len(), 1);
    let body = messages[0].payload_str().unwrap();
    assert!(body.contains(r#""order_id":42"#));
    assert!(body.contains(r#""customer_id":"c1""#));

    let message = OrderMessage::decode(&messages[0].payload).unwrap();
    assert_eq!(message.price, 10.5);
    let created_at = message.created_at().unwrap();
    assert_eq!(created_at.format(WIRE_DATE_TIME_FORMAT).to_string(), message.created_at);
}

#[tokio::test]
async fn empty_customer_is_rejected_before_any_side_effect() {
    let queue = InMemoryQueue::default();
    let publisher = OrderPublisher::new(queue.clone(), noop_tracer(), propagator());
    let service = OrderService::new(FixedIdRepository::new(1), publisher, noop_tracer());

    let err = service
        .create_order(&Context::new(), br#"{"customer_id":""}"#)
        .await
        .unwrap_err();

    assert!(matches!(err, IngressError::Validation(_)));
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.fault(), Fault::Client);
    assert_eq!(service.repository().inserts.load(Ordering::SeqCst), 0);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let queue = InMemoryQueue::default();
    let service = in_memory_service(&queue, noop_tracer);

    let err = service
        .create_order(&Context::new(), b"{not json")
        .await
        .unwrap_err();

    assert!(matches!(err, IngressError::DecodeFailed(_)));
    assert_eq!(err.status_code(), 400);
    assert!(service.repository().orders().unwrap().is_empty());
    assert!(queue.is_empty());
}

#[tokio::test]
async fn persistence_failure_skips_publish() {
    let queue = InMemoryQueue::default();
    let publisher = OrderPublisher::new(queue.clone(), noop_tracer(), propagator());
    let service = OrderService::new(UnavailableRepository::default(), publisher, noop_tracer());

    let err = service
        .create_order(&Context::new(), br#"{"customer_id":"c1","price":1}"#)
        .await
        .unwrap_err();

    assert!(matches!(err, IngressError::Persistence(_)));
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.fault(), Fault::Server);
    assert_eq!(service.repository().inserts.load(Ordering::SeqCst), 1);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn publish_failure_is_reported_after_persisting() {
    let queue = InMemoryQueue::default();
    let service = in_memory_service(&queue, noop_tracer);
    queue.close();

    let err = service
        .create_order(&Context::new(), br#"{"customer_id":"c1","price":1}"#)
        .await
        .unwrap_err();

    assert!(matches!(err, IngressError::Publish(_)));
    assert_eq!(err.status_code(), 400);
    // Stored but never published: the two steps are not atomic.
    assert_eq!(service.repository().orders().unwrap().len(), 1);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn each_request_publishes_its_own_id() {
    let queue = InMemoryQueue::default();
    let service = in_memory_service(&queue, noop_tracer);

    for customer in ["c1", "c2", "c3"] {
        let body = format!(r#"{{"customer_id":"{customer}","price":2.5}}"#);
        service.create_order(&Context::new(), body.as_bytes()).await.unwrap();
    }

    let ids: Vec<i64> = queue
        .messages()
        .iter()
        .map(|m| OrderMessage::decode(&m.payload).unwrap().order_id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}
