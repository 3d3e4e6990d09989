use crate::bus::BusError;

/// Error type for publishing an order.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The order could not be encoded to the wire format
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
    /// The broker write failed
    #[error(transparent)]
    Bus(#[from] BusError),
}
