//! Order creation: validate, persist, publish.

use opentelemetry::global::BoxedTracer;
use opentelemetry::trace::{Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::IngressError;
use crate::bus::Publisher;
use crate::order::{NewOrder, Order, OrderPublisher};
use crate::propagation::SharedPropagator;
use crate::repository::OrderRepository;

/// Body of `POST /api/v1/order`.
///
/// Absent fields decode to their defaults, so a missing `customer_id` is
/// reported by validation rather than by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderRequest {
    pub customer_id: String,
    pub price: f64,
}

impl OrderRequest {
    pub fn decode(body: &[u8]) -> Result<Self, IngressError> {
        serde_json::from_slice(body).map_err(IngressError::DecodeFailed)
    }

    pub fn validate(&self) -> Result<(), IngressError> {
        if self.customer_id.is_empty() {
            return Err(IngressError::Validation("customer_id is required".into()));
        }
        Ok(())
    }
}

/// Accepts orders: persists them, then hands them to the publisher.
///
/// Generic over the repository `R` and the broker `P`. Persist and publish
/// run serially; publish is skipped when persistence fails, and nothing
/// happens at all when the request is invalid.
pub struct OrderService<R, P> {
    repository: R,
    publisher: OrderPublisher<P>,
    tracer: BoxedTracer,
}

impl<R, P> OrderService<R, P> {
    pub fn new(repository: R, publisher: OrderPublisher<P>, tracer: BoxedTracer) -> Self {
        Self {
            repository,
            publisher,
            tracer,
        }
    }

    /// Get a reference to the repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn publisher(&self) -> &OrderPublisher<P> {
        &self.publisher
    }

    pub fn propagator(&self) -> &SharedPropagator {
        self.publisher.propagator()
    }
}

impl<R: OrderRepository, P: Publisher> OrderService<R, P> {
    /// Handle a raw request body under a `create-order-handler` span.
    pub async fn create_order(&self, parent: &Context, body: &[u8]) -> Result<Order, IngressError> {
        let span = self.tracer.start_with_context("create-order-handler", parent);
        let cx = parent.with_span(span);

        let result = self.handle(&cx, body).await;

        let span = cx.span();
        match &result {
            Ok(order) => {
                span.set_attribute(KeyValue::new("order_id", order.order_id.get()));
                debug!(order_id = %order.order_id, "order accepted");
            }
            Err(err) => {
                span.set_status(Status::error(err.span_status()));
                span.record_error(err);
                warn!(error = %err, fault = ?err.fault(), "order rejected");
            }
        }
        span.end();
        result
    }

    async fn handle(&self, cx: &Context, body: &[u8]) -> Result<Order, IngressError> {
        let request = OrderRequest::decode(body)?;
        request.validate()?;

        let new_order = NewOrder::new(request.customer_id, request.price);
        let order_id = self.repository.insert(cx, &new_order).await?;
        let order = new_order.assign_id(order_id);

        self.publisher.publish(cx, &order).await?;
        Ok(order)
    }
}
