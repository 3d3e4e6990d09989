//! Order persistence.
//!
//! The ingress handler only needs one operation from storage: insert an order
//! and get back its generated id. [`OrderRepository`] is that seam.
//!
//! - [`InMemoryOrderRepository`] - For testing and single-process scenarios
//! - `PostgresOrderRepository` - sqlx-backed `orders` table (feature `postgres`)

mod error;
mod in_memory;
mod repository;

#[cfg(feature = "postgres")]
mod postgres;

pub use error::RepositoryError;
pub use in_memory::InMemoryOrderRepository;
pub use repository::OrderRepository;

#[cfg(feature = "postgres")]
pub use postgres::PostgresOrderRepository;
