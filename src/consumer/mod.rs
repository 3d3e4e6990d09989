//! Order consumer: drains the broker topic and calls the integration
//! service once per order.
//!
//! ```text
//! fetch ─► extract trace context ─► decode OrderMessage ─► IntegrationCaller::call ─► commit
//!   ▲                                                                                   │
//!   └───────────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Delivery is at-most-once by default: the offset is committed whether or
//! not processing succeeded. See [`CommitPolicy`].

mod error;
mod order_consumer;
mod policy;

pub use error::ConsumerError;
pub use order_consumer::{ConsumerStats, OrderConsumer};
pub use policy::{CommitPolicy, ProcessOutcome};
