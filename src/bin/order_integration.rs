//! `order-integration`: the downstream service the consumer notifies.

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use order_relay::config::IntegrationConfig;
use order_relay::integration::{self, IntegrationService};
use order_relay::{http, shutdown, telemetry, PrivatBankClient, Telemetry};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = IntegrationConfig::parse();
    telemetry::init_logging();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "order-integration failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: IntegrationConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let telemetry = Telemetry::init(&config.service_name, config.otel_url.as_deref())?;

    let rates = PrivatBankClient::with_url(
        reqwest::Client::new(),
        config.rates_url.clone(),
        telemetry.tracer("privatbank"),
    );
    let service = Arc::new(IntegrationService::new(
        rates,
        telemetry.tracer("order"),
        telemetry.propagator(),
    ));

    let app = integration::router(service).merge(http::health_router(&config.service_name));
    let shutdown = shutdown::cancel_on_ctrl_c(CancellationToken::new());
    let listener = http::bind(&config.addr).await?;
    http::serve(listener, app, shutdown).await?;

    telemetry.shutdown()?;
    info!("order-integration stopped");
    Ok(())
}
