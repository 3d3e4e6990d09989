pub mod bus;
pub mod config;
pub mod consumer;
pub mod ingress;
pub mod integration;
pub mod order;
pub mod propagation;
pub mod repository;
pub mod shutdown;
pub mod telemetry;

#[cfg(feature = "http")]
pub mod http;

pub use bus::{BusError, Delivery, Header, InMemoryQueue, Message, OutboundMessage, Publisher, Subscriber};
pub use consumer::{CommitPolicy, ConsumerError, ConsumerStats, OrderConsumer, ProcessOutcome};
pub use ingress::{Fault, IngressError, OrderRequest, OrderService};
pub use integration::{
    HttpIntegrationClient, IntegrationCaller, IntegrationError, PrivatBankClient, RateError, RateSource,
};
pub use order::{NewOrder, Order, OrderId, OrderMessage, OrderPublisher, PublishError};
pub use propagation::{CarrierError, HeadersCarrier, SharedPropagator};
pub use repository::{InMemoryOrderRepository, OrderRepository, RepositoryError};
pub use telemetry::{Telemetry, TelemetryError};
