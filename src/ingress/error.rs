//! Error types for the ingress handler.

use crate::order::PublishError;
use crate::repository::RepositoryError;

/// Error type for order creation.
#[derive(Debug, thiserror::Error)]
pub enum IngressError {
    /// Request body is not a valid order request.
    #[error("{0}")]
    DecodeFailed(#[source] serde_json::Error),
    /// Request decoded but failed validation.
    #[error("{0}")]
    Validation(String),
    /// Persistence failed.
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
    /// Publishing to the broker failed.
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Which side of the boundary caused a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Bad input, detected before any side effect.
    Client,
    /// A dependency (storage, broker) failed.
    Server,
}

impl IngressError {
    /// HTTP status code reported to the client.
    ///
    /// Every failure maps to 400, dependency failures included; callers
    /// rely on the uniform status. [`IngressError::fault`] tells the two
    /// classes apart for logs and spans.
    pub fn status_code(&self) -> u16 {
        400
    }

    pub fn fault(&self) -> Fault {
        match self {
            IngressError::DecodeFailed(_) | IngressError::Validation(_) => Fault::Client,
            IngressError::Persistence(_) | IngressError::Publish(_) => Fault::Server,
        }
    }

    /// Span status description for the failing step.
    pub fn span_status(&self) -> &'static str {
        match self {
            IngressError::DecodeFailed(_) | IngressError::Validation(_) => {
                "parse order request error"
            }
            IngressError::Persistence(_) => "create order error",
            IngressError::Publish(_) => "publish order error",
        }
    }
}
