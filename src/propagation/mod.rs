//! Trace context propagation across the broker and HTTP boundaries.
//!
//! Broker headers are raw bytes while the propagation format works on string
//! keys and values. [`HeadersCarrier`] adapts one to the other, and
//! [`inject`] / [`extract`] drive the configured propagator through it.
//! [`HeaderInjector`] / [`HeaderExtractor`] do the same for HTTP header maps.
//!
//! ```text
//! publish:  Context ──inject──► HeadersCarrier ──► Vec<Header> ──► broker
//! consume:  broker ──► Vec<Header> ──► HeadersCarrier ──extract──► Context
//! ```

mod carrier;
mod error;
mod http;

use std::sync::Arc;

use opentelemetry::propagation::TextMapPropagator;
use opentelemetry_sdk::propagation::TraceContextPropagator;

pub use carrier::{extract, inject, HeadersCarrier};
pub use error::CarrierError;
pub use http::{extract_http, inject_http, HeaderExtractor, HeaderInjector};

/// Propagator shared by every component of a process.
pub type SharedPropagator = Arc<dyn TextMapPropagator + Send + Sync>;

/// W3C trace-context propagator (`traceparent` / `tracestate`).
pub fn trace_context() -> SharedPropagator {
    Arc::new(TraceContextPropagator::new())
}
