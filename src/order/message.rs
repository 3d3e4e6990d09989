//! Broker wire format for orders.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::entity::{Order, WIRE_DATE_TIME_FORMAT};

/// JSON payload written to the broker, one per order.
///
/// ```json
/// {"customer_id":"c1","order_id":42,"price":10.5,"created_at":"2024-03-09 14:05:07"}
/// ```
///
/// Missing fields decode to their defaults; only malformed JSON or
/// mistyped values are rejected.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderMessage {
    pub customer_id: String,
    pub order_id: i64,
    pub price: f64,
    pub created_at: String,
}

impl OrderMessage {
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Parse `created_at` back into a timestamp.
    pub fn created_at(&self) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(&self.created_at, WIRE_DATE_TIME_FORMAT)
    }
}

impl From<&Order> for OrderMessage {
    fn from(order: &Order) -> Self {
        Self {
            customer_id: order.customer_id.clone(),
            order_id: order.order_id.get(),
            price: order.price,
            created_at: order.created_at.format(WIRE_DATE_TIME_FORMAT).to_string(),
        }
    }
}
