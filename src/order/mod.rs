//! The order record, its broker wire format, and the publisher.
//!
//! ```text
//! OrderRequest ─► NewOrder ─(persistence id)─► Order ─► OrderMessage (JSON) ─► broker
//! ```

mod entity;
mod error;
mod message;
mod publisher;

pub use entity::{NewOrder, Order, OrderId, WIRE_DATE_TIME_FORMAT};
pub use error::PublishError;
pub use message::OrderMessage;
pub use publisher::OrderPublisher;
