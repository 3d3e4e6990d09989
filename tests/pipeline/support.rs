//! Fakes and helpers shared by the pipeline tests.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use opentelemetry::global::BoxedTracer;
use opentelemetry::trace::{TraceContextExt, TraceId, TracerProvider};
use opentelemetry::Context;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use order_relay::bus::InMemoryQueue;
use order_relay::integration::{IntegrationCaller, IntegrationError};
use order_relay::order::{NewOrder, OrderId, OrderPublisher};
use order_relay::propagation::{self, SharedPropagator};
use order_relay::repository::{InMemoryOrderRepository, OrderRepository, RepositoryError};
use order_relay::{OrderService, RateError, RateSource};
use tracing_subscriber::fmt::MakeWriter;

pub fn noop_tracer() -> BoxedTracer {
    opentelemetry::global::tracer("test")
}

pub fn propagator() -> SharedPropagator {
    propagation::trace_context()
}

/// Tracer provider that keeps every finished span in memory.
pub struct SpanRecorder {
    provider: SdkTracerProvider,
    exporter: InMemorySpanExporter,
}

impl SpanRecorder {
    pub fn new() -> Self {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        Self { provider, exporter }
    }

    pub fn tracer(&self) -> BoxedTracer {
        BoxedTracer::new(Box::new(self.provider.tracer("test")))
    }

    pub fn spans(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap()
    }

    pub fn span(&self, name: &str) -> SpanData {
        self.spans()
            .into_iter()
            .find(|span| span.name == name)
            .unwrap_or_else(|| panic!("no finished span named {name}"))
    }
}

/// Ingress wired to in-memory storage and an in-memory topic.
///
/// `tracer` is called once per component, since a `BoxedTracer` cannot be
/// shared.
pub fn in_memory_service(
    queue: &InMemoryQueue,
    tracer: impl Fn() -> BoxedTracer,
) -> OrderService<InMemoryOrderRepository, InMemoryQueue> {
    let publisher = OrderPublisher::new(queue.clone(), tracer(), propagator());
    OrderService::new(InMemoryOrderRepository::new(), publisher, tracer())
}

/// Repository that hands out one fixed id and counts inserts.
pub struct FixedIdRepository {
    id: i64,
    pub inserts: AtomicUsize,
}

impl FixedIdRepository {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            inserts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl OrderRepository for FixedIdRepository {
    async fn insert(&self, _cx: &Context, _order: &NewOrder) -> Result<OrderId, RepositoryError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        OrderId::new(self.id).ok_or(RepositoryError::InvalidId(self.id))
    }
}

/// Repository whose storage is always down.
#[derive(Default)]
pub struct UnavailableRepository {
    pub inserts: AtomicUsize,
}

#[async_trait]
impl OrderRepository for UnavailableRepository {
    async fn insert(&self, _cx: &Context, _order: &NewOrder) -> Result<OrderId, RepositoryError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Err(RepositoryError::Unavailable("connection refused".into()))
    }
}

/// A real transport failure: nothing listens on port 0.
pub async fn transport_error() -> reqwest::Error {
    reqwest::get("http://127.0.0.1:0/")
        .await
        .expect_err("port 0 never accepts connections")
}

/// Integration caller that records the trace id of every call and fails the
/// first `failures` calls with a transport error.
#[derive(Default)]
pub struct RecordingCaller {
    failures: usize,
    calls: Mutex<Vec<TraceId>>,
}

impl RecordingCaller {
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn trace_ids(&self) -> Vec<TraceId> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IntegrationCaller for RecordingCaller {
    async fn call(&self, cx: &Context) -> Result<(), IntegrationError> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(cx.span().span_context().trace_id());
            calls.len()
        };
        if attempt <= self.failures {
            return Err(IntegrationError::Transport(transport_error().await));
        }
        Ok(())
    }
}

/// Rate source with a scripted answer.
pub enum FakeRates {
    Rate(f64),
    /// The rate endpoint cannot be reached.
    Unreachable,
    /// The endpoint answered, but without an EUR entry.
    NoEur,
}

#[async_trait]
impl RateSource for FakeRates {
    async fn fetch_rate(&self, _cx: &Context) -> Result<f64, RateError> {
        match self {
            FakeRates::Rate(rate) => Ok(*rate),
            FakeRates::Unreachable => Err(RateError::Transport(transport_error().await)),
            FakeRates::NoEur => Err(RateError::MissingCurrency("EUR".into())),
        }
    }
}

/// Log output captured from a scoped `tracing` subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route `tracing` events on this thread into a buffer until the guard drops.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
