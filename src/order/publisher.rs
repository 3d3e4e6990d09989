//! Publishes persisted orders to the broker.

use opentelemetry::global::BoxedTracer;
use opentelemetry::trace::{Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use tracing::{debug, error, info};

use super::entity::Order;
use super::error::PublishError;
use crate::bus::{Delivery, OutboundMessage, Publisher};
use crate::propagation::{self, SharedPropagator};

/// Writes one broker message per order, carrying the caller's trace context.
///
/// Accepts only [`Order`], so an order without a persistence id cannot be
/// published. Each call makes exactly one write attempt and performs no
/// deduplication: a caller retry produces a second message.
pub struct OrderPublisher<P> {
    bus: P,
    tracer: BoxedTracer,
    propagator: SharedPropagator,
}

impl<P> OrderPublisher<P> {
    pub fn new(bus: P, tracer: BoxedTracer, propagator: SharedPropagator) -> Self {
        Self {
            bus,
            tracer,
            propagator,
        }
    }

    /// Get a reference to the underlying bus.
    pub fn bus(&self) -> &P {
        &self.bus
    }

    pub fn propagator(&self) -> &SharedPropagator {
        &self.propagator
    }
}

impl<P: Publisher> OrderPublisher<P> {
    /// Serialize `order` and write it, under a `create-order-queue` span.
    pub async fn publish(&self, cx: &Context, order: &Order) -> Result<Delivery, PublishError> {
        let span = self.tracer.start_with_context("create-order-queue", cx);
        let cx = cx.with_span(span);

        let result = self.write(&cx, order).await;

        let span = cx.span();
        match &result {
            Ok(delivery) => {
                span.set_attribute(KeyValue::new("messaging.kafka.offset", delivery.offset));
                span.set_status(Status::Ok);
            }
            Err(err) => {
                span.record_error(err);
                span.set_status(Status::error(err.to_string()));
            }
        }
        span.end();
        result
    }

    async fn write(&self, cx: &Context, order: &Order) -> Result<Delivery, PublishError> {
        let body = order.to_message().encode().map_err(|err| {
            error!(error = %err, "failed to marshal order");
            PublishError::Serialization(err)
        })?;
        let headers = propagation::inject(self.propagator.as_ref(), cx);

        info!(order_id = %order.order_id, "publishing order");
        let delivery = self
            .bus
            .publish(OutboundMessage::new(body).with_headers(headers))
            .await?;

        debug!(
            order_id = %order.order_id,
            partition = delivery.partition,
            offset = delivery.offset,
            "order published"
        );
        Ok(delivery)
    }
}
