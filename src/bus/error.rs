//! Error type for broker operations.

/// Failure talking to the broker. Each operation is attempted once; no
/// variant carries retry information.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    /// Connection to the broker failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// The broker rejected the message
    #[error("message rejected: {0}")]
    Rejected(String),
    /// Timeout waiting for acknowledgment
    #[error("broker timeout")]
    Timeout,
    /// The bus was closed locally
    #[error("bus closed")]
    Closed,
    /// Backend-specific failure
    #[error("broker error: {0}")]
    Backend(String),
}
