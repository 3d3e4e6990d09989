//! In-memory queue for testing and single-process scenarios.
//!
//! This module provides a thread-safe in-memory topic that implements
//! both `Publisher` and `Subscriber` traits, useful for:
//! - Unit and integration testing without a running broker
//! - Single-process development setups

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{BusError, Delivery, Message, OutboundMessage, Publisher, Subscriber};

/// In-memory, single-partition topic with one consumer group.
///
/// Features:
/// - Cloning shares the same log, so one clone can publish while another consumes
/// - Offsets are assigned sequentially from 0 in publish order
/// - `fetch` waits for the next message past the group's read cursor
/// - `commit` records the group's committed position (`offset + 1`)
/// - `reconnect` rewinds the cursor to the committed position, the way a
///   consumer group resumes after a restart
///
/// ## Example
///
/// ```
/// # tokio_test_block_on(async {
/// use order_relay::bus::{InMemoryQueue, OutboundMessage, Publisher, Subscriber};
///
/// let queue = InMemoryQueue::new("orders");
/// queue.publish(OutboundMessage::new(br#"{"order_id":1}"#.to_vec())).await.unwrap();
///
/// let message = queue.fetch().await.unwrap();
/// assert_eq!(message.offset, 0);
/// queue.commit(&message).await.unwrap();
/// assert_eq!(queue.committed_offset(), 1);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct InMemoryQueue {
    topic: Arc<str>,
    state: Arc<Mutex<QueueState>>,
    notify: Arc<Notify>,
}

#[derive(Default)]
struct QueueState {
    log: Vec<Message>,
    /// Next offset this consumer will read
    cursor: usize,
    /// Group position: next offset to read after a rejoin
    committed: i64,
    /// Every committed offset, in commit order
    commits: Vec<i64>,
    closed: bool,
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new("orders")
    }
}

impl InMemoryQueue {
    /// Create a new, empty topic.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: Arc::from(topic.into()),
            state: Arc::new(Mutex::new(QueueState::default())),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    // The state holds plain data, so a poisoned lock is still consistent.
    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get all messages in the log.
    pub fn messages(&self) -> Vec<Message> {
        self.state().log.clone()
    }

    /// Get the total number of messages in the log.
    pub fn len(&self) -> usize {
        self.state().log.len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.state().log.is_empty()
    }

    /// The group's committed position (next offset to read after a rejoin).
    pub fn committed_offset(&self) -> i64 {
        self.state().committed
    }

    /// Offsets of every committed message, in commit order.
    pub fn commits(&self) -> Vec<i64> {
        self.state().commits.clone()
    }

    /// Get the current read position.
    pub fn current_position(&self) -> usize {
        self.state().cursor
    }

    /// Rewind the read position to the committed offset.
    ///
    /// Messages that were fetched but never committed are delivered again.
    pub fn reconnect(&self) {
        let mut state = self.state();
        state.cursor = usize::try_from(state.committed).unwrap_or(0);
    }

    /// Close the topic. Pending and future fetches fail with [`BusError::Closed`].
    pub fn close(&self) {
        self.state().closed = true;
        self.notify.notify_waiters();
    }
}

#[async_trait]
impl Publisher for InMemoryQueue {
    async fn publish(&self, message: OutboundMessage) -> Result<Delivery, BusError> {
        let delivery = {
            let mut state = self.state();
            if state.closed {
                return Err(BusError::Closed);
            }
            let offset = state.log.len() as i64;
            state.log.push(Message {
                topic: self.topic.to_string(),
                partition: 0,
                offset,
                key: message.key,
                payload: message.payload,
                headers: message.headers,
            });
            Delivery {
                partition: 0,
                offset,
            }
        };
        self.notify.notify_waiters();
        Ok(delivery)
    }
}

#[async_trait]
impl Subscriber for InMemoryQueue {
    async fn fetch(&self) -> Result<Message, BusError> {
        loop {
            // Registered before the check so a publish in between still wakes us.
            let published = self.notify.notified();
            {
                let mut state = self.state();
                if state.closed {
                    return Err(BusError::Closed);
                }
                if let Some(message) = state.log.get(state.cursor).cloned() {
                    state.cursor += 1;
                    return Ok(message);
                }
            }
            published.await;
        }
    }

    async fn commit(&self, message: &Message) -> Result<(), BusError> {
        let mut state = self.state();
        state.committed = message.offset + 1;
        state.commits.push(message.offset);
        Ok(())
    }

    async fn rewind(&self, message: &Message) -> Result<(), BusError> {
        let mut state = self.state();
        if state.closed {
            return Err(BusError::Closed);
        }
        state.cursor = usize::try_from(message.offset)
            .map_err(|_| BusError::Rejected(format!("invalid offset {}", message.offset)))?;
        Ok(())
    }
}
