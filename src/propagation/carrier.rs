//! Broker header carrier.

use std::collections::HashMap;

use opentelemetry::propagation::{Extractor, Injector, TextMapPropagator};
use opentelemetry::Context;

use super::error::CarrierError;
use crate::bus::Header;

/// Flat header name → value map used as a propagation carrier.
///
/// - `get` returns `None` for absent keys and never fails
/// - `set` overwrites any existing value
/// - `keys` returns every key, in no particular order
///
/// A carrier lives for a single publish or consume operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeadersCarrier {
    values: HashMap<String, String>,
}

impl HeadersCarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge broker headers into a fresh carrier. Later duplicates win.
    pub fn from_headers(headers: &[Header]) -> Result<Self, CarrierError> {
        let mut carrier = Self::new();
        for header in headers {
            let value = header.value_str().ok_or_else(|| CarrierError::NonUtf8Value {
                key: header.key.clone(),
            })?;
            carrier.values.insert(header.key.clone(), value.to_string());
        }
        Ok(carrier)
    }

    /// One broker header per carried key.
    pub fn into_headers(self) -> Vec<Header> {
        self.values
            .into_iter()
            .map(|(key, value)| Header::new(key, value))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Injector for HeadersCarrier {
    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

impl Extractor for HeadersCarrier {
    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn keys(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }
}

/// Encode the propagation keys of `cx` as broker headers.
pub fn inject(propagator: &dyn TextMapPropagator, cx: &Context) -> Vec<Header> {
    let mut carrier = HeadersCarrier::new();
    propagator.inject_context(cx, &mut carrier);
    carrier.into_headers()
}

/// Derive a context from broker headers, layered over `cx`.
///
/// Unknown keys are ignored by the propagator. Fails only when a header value
/// is not text.
pub fn extract(
    propagator: &dyn TextMapPropagator,
    cx: &Context,
    headers: &[Header],
) -> Result<Context, CarrierError> {
    let carrier = HeadersCarrier::from_headers(headers)?;
    Ok(propagator.extract_with_context(cx, &carrier))
}
