//! Core publisher trait for the broker bus.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::BusError;
use super::message::{Delivery, OutboundMessage};

/// Trait for writing messages to a broker topic.
///
/// Implementations:
/// - [`InMemoryQueue`](super::InMemoryQueue) - For testing and single-process scenarios
/// - `KafkaPublisher` - For Apache Kafka (feature `kafka`)
///
/// `publish` resolves once the broker has acknowledged the write. It makes a
/// single attempt; callers that retry will produce duplicates.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, message: OutboundMessage) -> Result<Delivery, BusError>;
}

#[async_trait]
impl<P: Publisher + ?Sized> Publisher for Arc<P> {
    async fn publish(&self, message: OutboundMessage) -> Result<Delivery, BusError> {
        (**self).publish(message).await
    }
}
