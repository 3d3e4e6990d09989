//! `order-consumer`: drains the order topic and calls the integration
//! service once per order.

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use opentelemetry::Context;
use order_relay::bus::KafkaSubscriber;
use order_relay::config::ConsumerConfig;
use order_relay::{http, shutdown, telemetry, HttpIntegrationClient, OrderConsumer, Telemetry};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = ConsumerConfig::parse();
    telemetry::init_logging();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "order-consumer failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ConsumerConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let telemetry = Telemetry::init(&config.service_name, config.otel_url.as_deref())?;

    let subscriber = KafkaSubscriber::new(&config.kafka_url, &config.topic_name, &config.group_id)?;
    let integration = HttpIntegrationClient::new(
        reqwest::Client::new(),
        &config.integration_url,
        telemetry.tracer("integration"),
        telemetry.propagator(),
    )?
    .with_timeout(config.integration_timeout());
    let consumer = OrderConsumer::new(
        subscriber,
        integration,
        telemetry.tracer("order-consumer"),
        telemetry.propagator(),
    )
    .with_commit_policy(config.commit_policy);

    let shutdown = shutdown::cancel_on_ctrl_c(CancellationToken::new());
    let listener = http::bind(&config.addr).await?;
    let server = tokio::spawn(http::serve(
        listener,
        http::health_router(&config.service_name),
        shutdown.clone(),
    ));

    let consumed = consumer.run(&Context::new(), &shutdown).await;
    // A fatal consumer error takes the health endpoint down with it.
    shutdown.cancel();
    server.await??;
    telemetry.shutdown()?;

    let stats = consumed?;
    info!(
        fetched = stats.fetched,
        processed = stats.processed,
        failed = stats.failed,
        committed = stats.committed,
        "order-consumer stopped"
    );
    Ok(())
}
