//! PostgreSQL order storage (feature `postgres`).
//!
//! Expects an `orders` table with a generated integer `id`:
//!
//! ```sql
//! CREATE TABLE orders (
//!     id          SERIAL PRIMARY KEY,
//!     customer_id TEXT             NOT NULL,
//!     price       DOUBLE PRECISION NOT NULL,
//!     created_at  TIMESTAMP        NOT NULL
//! );
//! ```

use async_trait::async_trait;
use opentelemetry::global::BoxedTracer;
use opentelemetry::trace::{Span, Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::error;

use super::error::RepositoryError;
use super::repository::OrderRepository;
use crate::order::{NewOrder, OrderId};

const INSERT_ORDER: &str =
    "INSERT INTO orders (customer_id, price, created_at) VALUES ($1, $2, $3) RETURNING id::bigint";

pub struct PostgresOrderRepository {
    pool: PgPool,
    tracer: BoxedTracer,
}

impl PostgresOrderRepository {
    /// Connect a pool to `url`.
    pub async fn connect(url: &str, tracer: BoxedTracer) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .connect(url)
            .await
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        Ok(Self::new(pool, tracer))
    }

    pub fn new(pool: PgPool, tracer: BoxedTracer) -> Self {
        Self { pool, tracer }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn insert(&self, cx: &Context, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let mut span = self.tracer.start_with_context("create-order-repo", cx);
        span.set_attribute(KeyValue::new("customer_id", order.customer_id.clone()));
        span.set_attribute(KeyValue::new("order_created_at", order.created_at_wire()));
        let cx = cx.with_span(span);

        let inserted = sqlx::query_scalar::<_, i64>(INSERT_ORDER)
            .bind(&order.customer_id)
            .bind(order.price)
            .bind(order.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))
            .and_then(|id| OrderId::new(id).ok_or(RepositoryError::InvalidId(id)));

        if let Err(err) = &inserted {
            let span = cx.span();
            span.record_error(err);
            span.set_status(Status::error(err.to_string()));
            error!(error = %err, "failed to create order");
        }
        inserted
    }
}
