//! HTTP transport for the ingress.
//!
//! ## Routes
//!
//! - `POST /api/v1/order` (and `/api/v1/order/`): body = `OrderRequest` JSON.
//!   Replies 200 with an empty body, or 400 with
//!   `{ "status": "Invalid request.", "error": "..." }`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use opentelemetry::Context;
use serde_json::json;

use super::handler::OrderService;
use crate::bus::Publisher;
use crate::propagation;
use crate::repository::OrderRepository;

/// Build an axum `Router` serving the order endpoint.
pub fn router<R, P>(service: Arc<OrderService<R, P>>) -> Router
where
    R: OrderRepository + 'static,
    P: Publisher + 'static,
{
    Router::new()
        .route("/api/v1/order", post(create_order_handler::<R, P>))
        .route("/api/v1/order/", post(create_order_handler::<R, P>))
        .with_state(service)
}

/// `POST /api/v1/order`: persist and publish one order.
async fn create_order_handler<R, P>(
    State(service): State<Arc<OrderService<R, P>>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse
where
    R: OrderRepository + 'static,
    P: Publisher + 'static,
{
    let parent = propagation::extract_http(service.propagator().as_ref(), &Context::new(), &headers);
    match service.create_order(&parent, &body).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => {
            let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
            let body = json!({ "status": "Invalid request.", "error": e.to_string() });
            (status, Json(body)).into_response()
        }
    }
}
