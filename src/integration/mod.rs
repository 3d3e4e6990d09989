//! The downstream side of the pipeline.
//!
//! - [`HttpIntegrationClient`]: what the consumer calls for each order
//! - [`IntegrationService`] (feature `http`): the service that answers that
//!   call, looking up the current EUR rate through a [`RateSource`]

mod caller;
mod error;
mod rates;

#[cfg(feature = "http")]
mod service;

pub use caller::{HttpIntegrationClient, IntegrationCaller, INTEGRATION_PATH};
pub use error::{IntegrationError, RateError};
pub use rates::{buy_rate, ExchangeRate, PrivatBankClient, RateSource, PRIVATBANK_RATES_URL};

#[cfg(feature = "http")]
pub use service::{router, IntegrationService};
