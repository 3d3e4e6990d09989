//! Core subscriber trait for the broker bus.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::BusError;
use super::message::Message;

/// Trait for consuming a topic as a member of a consumer group.
///
/// This is a pull-based interface: `fetch` waits until the next unread
/// message is available, `commit` acknowledges a message so the group
/// resumes after it, and `rewind` moves the read position back so a
/// message is fetched again.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Fetch the next unread message, waiting until one is available.
    async fn fetch(&self) -> Result<Message, BusError>;

    /// Commit the offset of a fetched message.
    async fn commit(&self, message: &Message) -> Result<(), BusError>;

    /// Move the read position back to `message`; the next fetch returns it again.
    async fn rewind(&self, message: &Message) -> Result<(), BusError>;
}

#[async_trait]
impl<S: Subscriber + ?Sized> Subscriber for Arc<S> {
    async fn fetch(&self) -> Result<Message, BusError> {
        (**self).fetch().await
    }

    async fn commit(&self, message: &Message) -> Result<(), BusError> {
        (**self).commit(message).await
    }

    async fn rewind(&self, message: &Message) -> Result<(), BusError> {
        (**self).rewind(message).await
    }
}
