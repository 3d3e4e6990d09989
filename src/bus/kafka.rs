//! Kafka backend for the broker bus (feature `kafka`).
//!
//! - **Producer**: `FutureProducer`, every message goes to one fixed partition
//!   so publish order is preserved
//! - **Consumer**: `StreamConsumer` in a consumer group with auto-commit
//!   disabled; offsets are committed explicitly and synchronously, and
//!   `rewind` seeks the partition back to a message

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{Header as KafkaHeader, Headers, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::{Message as KafkaMessage, Offset, TopicPartitionList};
use tracing::debug;

use super::{BusError, Delivery, Header, Message, OutboundMessage, Publisher, Subscriber};

const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);
const SEEK_TIMEOUT: Duration = Duration::from_secs(5);

/// Writes messages to a single partition of a Kafka topic.
pub struct KafkaPublisher {
    producer: FutureProducer,
    topic: String,
    partition: i32,
    timeout: Duration,
}

impl KafkaPublisher {
    /// Create a producer for `topic` on the given bootstrap servers.
    ///
    /// ## Errors
    /// - [`BusError::ConnectionFailed`]: the client could not be created
    pub fn new(brokers: &str, topic: impl Into<String>) -> Result<Self, BusError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", DEFAULT_DELIVERY_TIMEOUT.as_millis().to_string())
            .create()
            .map_err(|e| {
                BusError::ConnectionFailed(format!("failed to create Kafka producer: {}", e))
            })?;

        Ok(Self {
            producer,
            topic: topic.into(),
            partition: 0,
            timeout: DEFAULT_DELIVERY_TIMEOUT,
        })
    }

    /// Set the target partition (default 0).
    pub fn with_partition(mut self, partition: i32) -> Self {
        self.partition = partition;
        self
    }

    /// Set how long to wait for the broker acknowledgment.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl Publisher for KafkaPublisher {
    async fn publish(&self, message: OutboundMessage) -> Result<Delivery, BusError> {
        let headers = message.headers.iter().fold(
            OwnedHeaders::new_with_capacity(message.headers.len()),
            |headers, header| {
                headers.insert(KafkaHeader {
                    key: &header.key,
                    value: Some(&header.value),
                })
            },
        );

        let mut record: FutureRecord<'_, Vec<u8>, Vec<u8>> = FutureRecord::to(&self.topic)
            .payload(&message.payload)
            .partition(self.partition)
            .headers(headers);
        if let Some(key) = &message.key {
            record = record.key(key);
        }

        let delivery = self
            .producer
            .send(record, self.timeout)
            .await
            .map_err(|(e, _)| BusError::Rejected(format!("failed to send to Kafka: {}", e)))?;

        debug!(
            topic = %self.topic,
            partition = delivery.partition,
            offset = delivery.offset,
            "message delivered"
        );
        Ok(Delivery {
            partition: delivery.partition,
            offset: delivery.offset,
        })
    }
}

/// Consumes a Kafka topic as a member of a consumer group.
pub struct KafkaSubscriber {
    consumer: StreamConsumer,
}

impl KafkaSubscriber {
    /// Join `group_id` and subscribe to `topic`.
    ///
    /// Auto-commit is disabled; a group with no committed offset starts from
    /// the earliest message.
    pub fn new(brokers: &str, topic: &str, group_id: &str) -> Result<Self, BusError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()
            .map_err(|e| {
                BusError::ConnectionFailed(format!("failed to create Kafka consumer: {}", e))
            })?;

        consumer
            .subscribe(&[topic])
            .map_err(|e| BusError::Backend(format!("failed to subscribe: {}", e)))?;

        Ok(Self { consumer })
    }

    fn to_message(kafka_msg: &impl KafkaMessage) -> Message {
        let headers = kafka_msg
            .headers()
            .map(|headers| {
                headers
                    .iter()
                    .map(|header| Header::new(header.key, header.value.unwrap_or_default()))
                    .collect()
            })
            .unwrap_or_default();

        Message {
            topic: kafka_msg.topic().to_string(),
            partition: kafka_msg.partition(),
            offset: kafka_msg.offset(),
            key: kafka_msg.key().map(<[u8]>::to_vec),
            payload: kafka_msg.payload().map(<[u8]>::to_vec).unwrap_or_default(),
            headers,
        }
    }
}

#[async_trait]
impl Subscriber for KafkaSubscriber {
    async fn fetch(&self) -> Result<Message, BusError> {
        let kafka_msg = self
            .consumer
            .recv()
            .await
            .map_err(|e| BusError::Backend(format!("failed to fetch message: {}", e)))?;
        Ok(Self::to_message(&kafka_msg))
    }

    async fn commit(&self, message: &Message) -> Result<(), BusError> {
        let mut offsets = TopicPartitionList::new();
        offsets
            .add_partition_offset(
                &message.topic,
                message.partition,
                Offset::Offset(message.offset + 1),
            )
            .map_err(|e| BusError::Backend(format!("invalid commit offset: {}", e)))?;

        self.consumer
            .commit(&offsets, CommitMode::Sync)
            .map_err(|e| BusError::Backend(format!("failed to commit offset: {}", e)))
    }

    async fn rewind(&self, message: &Message) -> Result<(), BusError> {
        self.consumer
            .seek(
                &message.topic,
                message.partition,
                Offset::Offset(message.offset),
                SEEK_TIMEOUT,
            )
            .map_err(|e| BusError::Backend(format!("failed to seek: {}", e)))
    }
}
