//! Calls the downstream integration service for each consumed order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use opentelemetry::global::BoxedTracer;
use opentelemetry::trace::{Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use reqwest::header::HeaderMap;
use reqwest::{Client, Url};
use tracing::{error, warn};

use super::error::IntegrationError;
use crate::propagation::{self, SharedPropagator};

/// Path appended to the integration base URL.
pub const INTEGRATION_PATH: &str = "/api/v1/order";

/// Trait for notifying the downstream system about one order.
///
/// Only a transport failure is an error; whatever the downstream answers is
/// accepted.
#[async_trait]
pub trait IntegrationCaller: Send + Sync {
    async fn call(&self, cx: &Context) -> Result<(), IntegrationError>;
}

#[async_trait]
impl<C: IntegrationCaller + ?Sized> IntegrationCaller for Arc<C> {
    async fn call(&self, cx: &Context) -> Result<(), IntegrationError> {
        (**self).call(cx).await
    }
}

/// `GET {base}/api/v1/order` with the caller's trace context in the headers.
///
/// One attempt per call, no retry.
pub struct HttpIntegrationClient {
    client: Client,
    url: Url,
    timeout: Option<Duration>,
    tracer: BoxedTracer,
    propagator: SharedPropagator,
}

impl HttpIntegrationClient {
    /// Create a client for the integration service at `base_url`.
    ///
    /// ## Errors
    /// - [`IntegrationError::InvalidUrl`]: `base_url` plus the order path is not a URL
    pub fn new(
        client: Client,
        base_url: &str,
        tracer: BoxedTracer,
        propagator: SharedPropagator,
    ) -> Result<Self, IntegrationError> {
        let raw = format!("{}{}", base_url.trim_end_matches('/'), INTEGRATION_PATH);
        let url = Url::parse(&raw).map_err(|e| IntegrationError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            url,
            timeout: None,
            tracer,
            propagator,
        })
    }

    /// Bound each request by `timeout` (`None` waits indefinitely).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl IntegrationCaller for HttpIntegrationClient {
    async fn call(&self, cx: &Context) -> Result<(), IntegrationError> {
        let span = self.tracer.start_with_context("call-integration", cx);
        let cx = cx.with_span(span);

        let mut headers = HeaderMap::new();
        propagation::inject_http(self.propagator.as_ref(), &cx, &mut headers);

        let mut request = self.client.get(self.url.clone()).headers(headers);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let sent = request.send().await;

        let span = cx.span();
        let result = match sent {
            Ok(response) => {
                let status = response.status();
                span.set_attribute(KeyValue::new(
                    "http.response.status_code",
                    i64::from(status.as_u16()),
                ));
                if !status.is_success() {
                    warn!(status = status.as_u16(), url = %self.url, "integration returned non-success status");
                }
                Ok(())
            }
            Err(err) => {
                error!(error = %err, url = %self.url, "failed to call integration");
                span.set_status(Status::error("failed to do request"));
                span.record_error(&err);
                Err(IntegrationError::Transport(err))
            }
        };
        span.end();
        result
    }
}
