//! `order-api`: accepts orders over HTTP, stores them in Postgres, and
//! publishes them to Kafka.

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use order_relay::bus::KafkaPublisher;
use order_relay::config::ApiConfig;
use order_relay::repository::PostgresOrderRepository;
use order_relay::{http, ingress, shutdown, telemetry, OrderPublisher, OrderService, Telemetry};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = ApiConfig::parse();
    telemetry::init_logging();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "order-api failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ApiConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let telemetry = Telemetry::init(&config.service_name, config.otel_url.as_deref())?;

    let repository =
        PostgresOrderRepository::connect(&config.db_url, telemetry.tracer("order-repository")).await?;
    let bus = KafkaPublisher::new(&config.kafka_url, config.topic_name.clone())?
        .with_partition(config.partition)
        .with_timeout(config.publish_timeout());
    let publisher = OrderPublisher::new(bus, telemetry.tracer("order-queue"), telemetry.propagator());
    let service = Arc::new(OrderService::new(
        repository,
        publisher,
        telemetry.tracer("order-handler"),
    ));

    let app = ingress::router(service).merge(http::health_router(&config.service_name));
    let shutdown = shutdown::cancel_on_ctrl_c(CancellationToken::new());
    let listener = http::bind(&config.addr).await?;
    http::serve(listener, app, shutdown).await?;

    telemetry.shutdown()?;
    info!("order-api stopped");
    Ok(())
}
