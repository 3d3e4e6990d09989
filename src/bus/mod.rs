//! Broker bus: the durable, ordered transport between the ingress and the consumer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐          ┌──────────────────────────────┐
//! │  order-api                   │          │  order-consumer              │
//! │  OrderPublisher ─► Publisher │          │  Subscriber ─► OrderConsumer │
//! └──────────────┬───────────────┘          └──────────────▲───────────────┘
//!                │  publish(OutboundMessage)               │ fetch / commit / rewind
//!                ▼                                         │
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      topic, single target partition                     │
//! │      InMemoryQueue (included)      │      KafkaPublisher / KafkaSubscriber │
//! │                                    │      (feature "kafka")              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The broker is the only coupling between the two processes. Messages carry
//! an opaque payload plus raw byte headers; trace propagation keys travel in
//! the headers (see [`crate::propagation`]).

mod error;
mod in_memory_queue;
mod message;
mod publisher;
mod subscriber;

#[cfg(feature = "kafka")]
mod kafka;

pub use error::BusError;
pub use in_memory_queue::InMemoryQueue;
pub use message::{Delivery, Header, Message, OutboundMessage};
pub use publisher::Publisher;
pub use subscriber::Subscriber;

#[cfg(feature = "kafka")]
pub use kafka::{KafkaPublisher, KafkaSubscriber};
