//! Order ingress: accepts order requests over HTTP, persists each one, then
//! publishes it to the broker.
//!
//! ```text
//! POST /api/v1/order ─► OrderRequest ─validate─► OrderRepository::insert ─► OrderPublisher::publish
//! ```
//!
//! Any failure along the way is reported as a 400 (see [`IngressError`]).

mod error;
mod handler;

#[cfg(feature = "http")]
mod http;

pub use error::{Fault, IngressError};
pub use handler::{OrderRequest, OrderService};

#[cfg(feature = "http")]
pub use http::router;
