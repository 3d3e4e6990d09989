//! The order record as it moves from ingestion to persistence.

use std::fmt;
use std::num::NonZeroI64;

use chrono::{Local, NaiveDateTime, SubsecRound};

use super::message::OrderMessage;

/// Date-time layout used for `created_at` on the wire and in span attributes.
pub const WIRE_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Identifier assigned by persistence. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(NonZeroI64);

impl OrderId {
    /// Wrap a persistence-generated id. Returns `None` for `0`.
    pub fn new(id: i64) -> Option<Self> {
        NonZeroI64::new(id).map(Self)
    }

    pub fn get(self) -> i64 {
        self.0.get()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An order accepted by the ingress handler but not yet persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewOrder {
    pub customer_id: String,
    pub price: f64,
    pub created_at: NaiveDateTime,
}

impl NewOrder {
    /// Create an order stamped with the current local time.
    pub fn new(customer_id: impl Into<String>, price: f64) -> Self {
        Self::at(customer_id, price, Local::now().naive_local())
    }

    /// Create an order with an explicit creation time.
    ///
    /// Sub-second precision is dropped so the value survives the wire format.
    pub fn at(customer_id: impl Into<String>, price: f64, created_at: NaiveDateTime) -> Self {
        Self {
            customer_id: customer_id.into(),
            price,
            created_at: created_at.trunc_subsecs(0),
        }
    }

    /// Attach the id returned by persistence.
    pub fn assign_id(self, order_id: OrderId) -> Order {
        Order {
            order_id,
            customer_id: self.customer_id,
            price: self.price,
            created_at: self.created_at,
        }
    }

    pub fn created_at_wire(&self) -> String {
        self.created_at.format(WIRE_DATE_TIME_FORMAT).to_string()
    }
}

/// A persisted order, ready to be handed to the publisher.
#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: String,
    pub price: f64,
    pub created_at: NaiveDateTime,
}

impl Order {
    /// Build the broker payload for this order.
    pub fn to_message(&self) -> OrderMessage {
        OrderMessage::from(self)
    }
}
