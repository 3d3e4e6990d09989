//! Process configuration. Every setting is a flag with an environment
//! fallback (`API_*`, `CONSUMER_*`, `INTEGRATION_*`).

use std::time::Duration;

use clap::Parser;

use crate::consumer::CommitPolicy;
use crate::integration::PRIVATBANK_RATES_URL;

/// Configuration of the `order-api` process.
#[derive(Debug, Clone, Parser)]
#[command(name = "order-api", about = "Accepts orders, stores them, and publishes them")]
pub struct ApiConfig {
    #[arg(long, env = "API_ADDR")]
    pub addr: String,
    #[arg(long, env = "API_DB_URL")]
    pub db_url: String,
    #[arg(long, env = "API_SERVICE_NAME")]
    pub service_name: String,
    #[arg(long, env = "API_OTEL_URL")]
    pub otel_url: Option<String>,
    #[arg(long, env = "API_KAFKA_URL")]
    pub kafka_url: String,
    #[arg(long, env = "API_TOPIC_NAME")]
    pub topic_name: String,
    /// Partition every order is written to
    #[arg(long, env = "API_PARTITION", default_value_t = 0)]
    pub partition: i32,
    #[arg(long, env = "API_PUBLISH_TIMEOUT_MS", default_value_t = 5000)]
    pub publish_timeout_ms: u64,
}

impl ApiConfig {
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }
}

/// Configuration of the `order-consumer` process.
#[derive(Debug, Clone, Parser)]
#[command(name = "order-consumer", about = "Drains the order topic into the integration service")]
pub struct ConsumerConfig {
    #[arg(long, env = "CONSUMER_ADDR")]
    pub addr: String,
    #[arg(long, env = "CONSUMER_SERVICE_NAME")]
    pub service_name: String,
    #[arg(long, env = "CONSUMER_OTEL_URL")]
    pub otel_url: Option<String>,
    #[arg(long, env = "CONSUMER_KAFKA_URL")]
    pub kafka_url: String,
    #[arg(long, env = "CONSUMER_TOPIC_NAME")]
    pub topic_name: String,
    #[arg(long, env = "CONSUMER_GROUP_ID", default_value = "consumer")]
    pub group_id: String,
    /// Base URL of the integration service
    #[arg(long, env = "CONSUMER_INTEGRATION_URL")]
    pub integration_url: String,
    #[arg(long, env = "CONSUMER_INTEGRATION_TIMEOUT_MS")]
    pub integration_timeout_ms: Option<u64>,
    #[arg(long, env = "CONSUMER_COMMIT_POLICY", value_enum, default_value_t = CommitPolicy::Always)]
    pub commit_policy: CommitPolicy,
}

impl ConsumerConfig {
    pub fn integration_timeout(&self) -> Option<Duration> {
        self.integration_timeout_ms.map(Duration::from_millis)
    }
}

/// Configuration of the `order-integration` process.
#[derive(Debug, Clone, Parser)]
#[command(name = "order-integration", about = "Answers order notifications with the current EUR rate")]
pub struct IntegrationConfig {
    #[arg(long, env = "INTEGRATION_ADDR")]
    pub addr: String,
    #[arg(long, env = "INTEGRATION_SERVICE_NAME")]
    pub service_name: String,
    #[arg(long, env = "INTEGRATION_OTEL_URL")]
    pub otel_url: Option<String>,
    #[arg(long, env = "INTEGRATION_RATES_URL", default_value = PRIVATBANK_RATES_URL)]
    pub rates_url: String,
}
