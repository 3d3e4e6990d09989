//! Logging and span recording setup for the binaries.
//!
//! Logs go through `tracing` with an `EnvFilter` (`RUST_LOG`, default
//! `info`). Spans are recorded by an OpenTelemetry SDK tracer provider,
//! exported over OTLP when the `otlp` feature is enabled and an endpoint is
//! configured.

use opentelemetry::global::{self, BoxedTracer};
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::EnvFilter;

use crate::propagation::{self, SharedPropagator};

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The span exporter could not be built
    #[error("failed to setup tracing: {0}")]
    Exporter(String),
    #[error("failed to shut down tracer provider: {0}")]
    Shutdown(String),
}

/// Install the global `tracing` subscriber. Later calls are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

/// Owns the tracer provider of one process.
pub struct Telemetry {
    provider: SdkTracerProvider,
    propagator: SharedPropagator,
}

impl Telemetry {
    /// Build the tracer provider for `service_name`.
    ///
    /// `otel_url` is the OTLP collector endpoint; it is only used when the
    /// `otlp` feature is enabled. Without it spans are recorded but not
    /// exported.
    pub fn init(service_name: &str, otel_url: Option<&str>) -> Result<Self, TelemetryError> {
        let resource = Resource::builder()
            .with_service_name(service_name.to_string())
            .build();
        let builder = SdkTracerProvider::builder().with_resource(resource);
        let builder = with_exporter(builder, otel_url)?;
        let provider = builder.build();

        global::set_tracer_provider(provider.clone());
        Ok(Self {
            provider,
            propagator: propagation::trace_context(),
        })
    }

    /// A named tracer from this provider.
    pub fn tracer(&self, name: &str) -> BoxedTracer {
        BoxedTracer::new(Box::new(self.provider.tracer(name.to_string())))
    }

    pub fn propagator(&self) -> SharedPropagator {
        self.propagator.clone()
    }

    /// Flush pending spans and stop the provider.
    pub fn shutdown(self) -> Result<(), TelemetryError> {
        self.provider
            .shutdown()
            .map_err(|e| TelemetryError::Shutdown(e.to_string()))
    }
}

#[cfg(feature = "otlp")]
fn with_exporter(
    builder: opentelemetry_sdk::trace::TracerProviderBuilder,
    otel_url: Option<&str>,
) -> Result<opentelemetry_sdk::trace::TracerProviderBuilder, TelemetryError> {
    use opentelemetry_otlp::WithExportConfig;

    let Some(url) = otel_url else {
        return Ok(builder);
    };
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(url)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;
    Ok(builder.with_batch_exporter(exporter))
}

#[cfg(not(feature = "otlp"))]
fn with_exporter(
    builder: opentelemetry_sdk::trace::TracerProviderBuilder,
    otel_url: Option<&str>,
) -> Result<opentelemetry_sdk::trace::TracerProviderBuilder, TelemetryError> {
    if let Some(url) = otel_url {
        tracing::warn!(otel_url = url, "built without the otlp feature, spans are not exported");
    }
    Ok(builder)
}
