/// Error type for the downstream integration call.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    /// The configured base URL does not form a valid request URL
    #[error("invalid integration url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// The request could not be sent or no response arrived
    #[error("integration request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Error type for fetching the exchange rate.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("failed to do request: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("failed to read body: {0}")]
    Body(#[source] reqwest::Error),
    #[error("failed to decode rates: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid {ccy} rate {value:?}")]
    InvalidRate { ccy: String, value: String },
    #[error("no rate for {0}")]
    MissingCurrency(String),
}

impl RateError {
    /// The rate source could not be reached or its body was cut short.
    ///
    /// A body that arrived but holds no usable EUR rate is not unavailable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, RateError::Transport(_) | RateError::Body(_))
    }
}
