//! The consumer loop: fetch, process, commit.

use opentelemetry::global::BoxedTracer;
use opentelemetry::trace::{Span, Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::error::ConsumerError;
use super::policy::{CommitPolicy, ProcessOutcome};
use crate::bus::{Message, Subscriber};
use crate::integration::IntegrationCaller;
use crate::order::OrderMessage;
use crate::propagation::{self, SharedPropagator};

/// Counters kept by [`OrderConsumer::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub fetched: u64,
    /// Decoded and delivered downstream
    pub processed: u64,
    /// Undecodable, or the downstream call failed
    pub failed: u64,
    pub committed: u64,
    pub commit_failures: u64,
    /// Withheld commits; the message was rewound and fetched again
    pub rewound: u64,
}

/// Reads orders from the broker and notifies the integration service.
///
/// Strictly sequential: one message is fetched, processed, and committed
/// before the next fetch. Cancellation is observed only while waiting on a
/// fetch, so a message that has been fetched is always finished.
pub struct OrderConsumer<S, C> {
    subscriber: S,
    integration: C,
    tracer: BoxedTracer,
    propagator: SharedPropagator,
    policy: CommitPolicy,
}

impl<S, C> OrderConsumer<S, C> {
    pub fn new(subscriber: S, integration: C, tracer: BoxedTracer, propagator: SharedPropagator) -> Self {
        Self {
            subscriber,
            integration,
            tracer,
            propagator,
            policy: CommitPolicy::default(),
        }
    }

    pub fn with_commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn commit_policy(&self) -> CommitPolicy {
        self.policy
    }

    /// Get a reference to the subscriber.
    pub fn subscriber(&self) -> &S {
        &self.subscriber
    }
}

impl<S: Subscriber, C: IntegrationCaller> OrderConsumer<S, C> {
    /// Run until `shutdown` is cancelled, or a fetch or rewind fails.
    ///
    /// `cx` is the base context for messages that carry no usable trace
    /// headers. A fetch failure is fatal and returned; everything after a
    /// successful fetch is logged and the loop moves on.
    ///
    /// When the commit policy withholds a commit, the subscriber is rewound
    /// to that message so the next fetch delivers it again. Later messages
    /// are never committed past it. A failed rewind is fatal: the group then
    /// resumes from its committed position on restart.
    pub async fn run(
        &self,
        cx: &Context,
        shutdown: &CancellationToken,
    ) -> Result<ConsumerStats, ConsumerError> {
        let mut stats = ConsumerStats::default();
        info!(policy = %self.policy, "consumer started");

        loop {
            let fetched = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!(
                        fetched = stats.fetched,
                        committed = stats.committed,
                        "consumer stopped"
                    );
                    return Ok(stats);
                }
                fetched = self.subscriber.fetch() => fetched,
            };

            let message = match fetched {
                Ok(message) => message,
                Err(source) => {
                    error!(error = %source, "failed to read message");
                    return Err(ConsumerError::Fetch { source, stats });
                }
            };
            stats.fetched += 1;

            let outcome = self.process_message(cx, &message).await;
            match outcome {
                ProcessOutcome::Processed => stats.processed += 1,
                ProcessOutcome::Undecodable | ProcessOutcome::CallFailed => stats.failed += 1,
            }

            if !self.policy.should_commit(outcome) {
                warn!(offset = message.offset, "commit withheld, message will be redelivered");
                if let Err(source) = self.subscriber.rewind(&message).await {
                    error!(error = %source, offset = message.offset, "failed to rewind to message");
                    return Err(ConsumerError::Rewind { source, stats });
                }
                stats.rewound += 1;
                continue;
            }
            match self.subscriber.commit(&message).await {
                Ok(()) => stats.committed += 1,
                Err(err) => {
                    error!(error = %err, offset = message.offset, "failed to commit message");
                    stats.commit_failures += 1;
                }
            }
        }
    }

    /// Decode one message and call the integration service with its trace context.
    pub async fn process_message(&self, base: &Context, message: &Message) -> ProcessOutcome {
        let parent = match propagation::extract(self.propagator.as_ref(), base, &message.headers) {
            Ok(cx) => cx,
            Err(err) => {
                warn!(error = %err, offset = message.offset, "failed to extract trace context");
                base.clone()
            }
        };

        info!(
            offset = message.offset,
            message = message.payload_str().unwrap_or("<binary>"),
            "received message"
        );

        let mut span = self.tracer.start_with_context("consume-order-message", &parent);
        let order = match OrderMessage::decode(&message.payload) {
            Ok(order) => order,
            Err(err) => {
                error!(error = %err, offset = message.offset, "failed to unmarshal order");
                span.record_error(&err);
                span.set_status(Status::error(err.to_string()));
                span.end();
                return ProcessOutcome::Undecodable;
            }
        };
        span.set_attribute(KeyValue::new("order_id", order.order_id));
        span.set_attribute(KeyValue::new("customer_id", order.customer_id.clone()));
        let cx = parent.with_span(span);

        let outcome = match self.integration.call(&cx).await {
            Ok(()) => ProcessOutcome::Processed,
            Err(err) => {
                error!(error = %err, order_id = order.order_id, "failed to process message");
                cx.span().set_status(Status::error(err.to_string()));
                ProcessOutcome::CallFailed
            }
        };
        cx.span().end();
        outcome
    }
}
