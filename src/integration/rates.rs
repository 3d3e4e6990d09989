//! Exchange-rate lookup used by the integration service.

use async_trait::async_trait;
use opentelemetry::global::BoxedTracer;
use opentelemetry::trace::{Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::error::RateError;

/// PrivatBank public cash-rate endpoint.
pub const PRIVATBANK_RATES_URL: &str =
    "https://api.privatbank.ua/p24api/pubinfo?json=null&exchange=null&coursid=5";

const EUR: &str = "EUR";

/// Trait for looking up the current EUR rate.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rate(&self, cx: &Context) -> Result<f64, RateError>;
}

/// One entry of the PrivatBank rate list. Rates arrive as decimal strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExchangeRate {
    pub ccy: String,
    pub base_ccy: String,
    pub buy: String,
    pub sale: String,
}

/// Find the buy rate of `ccy` in a decoded rate list.
pub fn buy_rate(rates: &[ExchangeRate], ccy: &str) -> Result<f64, RateError> {
    let rate = rates
        .iter()
        .find(|r| r.ccy == ccy)
        .ok_or_else(|| RateError::MissingCurrency(ccy.to_string()))?;
    rate.buy.trim().parse().map_err(|_| RateError::InvalidRate {
        ccy: ccy.to_string(),
        value: rate.buy.clone(),
    })
}

pub struct PrivatBankClient {
    client: Client,
    url: String,
    tracer: BoxedTracer,
}

impl PrivatBankClient {
    pub fn new(client: Client, tracer: BoxedTracer) -> Self {
        Self::with_url(client, PRIVATBANK_RATES_URL, tracer)
    }

    pub fn with_url(client: Client, url: impl Into<String>, tracer: BoxedTracer) -> Self {
        Self {
            client,
            url: url.into(),
            tracer,
        }
    }

    async fn eur_rate(&self) -> Result<f64, RateError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(RateError::Transport)?;
        let body = response.bytes().await.map_err(RateError::Body)?;
        debug!(bytes = body.len(), "received rates body");

        let rates: Vec<ExchangeRate> = serde_json::from_slice(&body).map_err(RateError::Decode)?;
        buy_rate(&rates, EUR)
    }
}

#[async_trait]
impl RateSource for PrivatBankClient {
    async fn fetch_rate(&self, cx: &Context) -> Result<f64, RateError> {
        let span = self.tracer.start_with_context("GetEURRate", cx);
        let cx = cx.with_span(span);

        let result = self.eur_rate().await;

        let span = cx.span();
        match &result {
            Ok(rate) => span.set_attribute(KeyValue::new("rate", *rate)),
            Err(err) => {
                span.set_status(Status::error(err.to_string()));
                span.record_error(err);
            }
        }
        span.end();
        result
    }
}
