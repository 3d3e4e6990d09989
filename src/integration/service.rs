//! HTTP surface of the integration service.
//!
//! ## Routes
//!
//! - `GET /api/v1/order` (and `/api/v1/order/`): looks up the EUR rate.
//!   200 on success, 500 when the rate source is unreachable. A payload
//!   without a usable EUR rate is logged and still answers 200.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use opentelemetry::global::BoxedTracer;
use opentelemetry::trace::{Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use tracing::{error, warn};

use super::rates::RateSource;
use crate::propagation::{self, SharedPropagator};

pub struct IntegrationService<S> {
    rates: S,
    tracer: BoxedTracer,
    propagator: SharedPropagator,
}

impl<S: RateSource> IntegrationService<S> {
    pub fn new(rates: S, tracer: BoxedTracer, propagator: SharedPropagator) -> Self {
        Self {
            rates,
            tracer,
            propagator,
        }
    }

    /// Process one order notification under a `ProcessOrder` span.
    pub async fn process_order(&self, parent: &Context) -> StatusCode {
        let span = self.tracer.start_with_context("ProcessOrder", parent);
        let cx = parent.with_span(span);

        let status = match self.rates.fetch_rate(&cx).await {
            Ok(_) => StatusCode::OK,
            Err(err) if err.is_unavailable() => {
                error!(error = %err, "failed to get eur rate");
                cx.span().set_status(Status::error(err.to_string()));
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Err(err) => {
                warn!(error = %err, "eur rate unusable");
                cx.span()
                    .add_event("rate unusable", vec![KeyValue::new("error", err.to_string())]);
                StatusCode::OK
            }
        };
        cx.span().end();
        status
    }
}

/// Build an axum `Router` for the integration service.
pub fn router<S: RateSource + 'static>(service: Arc<IntegrationService<S>>) -> Router {
    Router::new()
        .route("/api/v1/order", get(process_order_handler::<S>))
        .route("/api/v1/order/", get(process_order_handler::<S>))
        .with_state(service)
}

async fn process_order_handler<S: RateSource + 'static>(
    State(service): State<Arc<IntegrationService<S>>>,
    headers: HeaderMap,
) -> StatusCode {
    let parent = propagation::extract_http(service.propagator.as_ref(), &Context::new(), &headers);
    service.process_order(&parent).await
}
