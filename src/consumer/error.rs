use crate::bus::BusError;

use super::order_consumer::ConsumerStats;

/// Error that stops the consumer loop.
#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    /// Fetching the next message failed. Carries the counters up to that point.
    #[error("failed to read message: {source}")]
    Fetch {
        #[source]
        source: BusError,
        stats: ConsumerStats,
    },
    /// A withheld message could not be rewound, so continuing would commit past it.
    #[error("failed to rewind to withheld message: {source}")]
    Rewind {
        #[source]
        source: BusError,
        stats: ConsumerStats,
    },
}

impl ConsumerError {
    pub fn stats(&self) -> &ConsumerStats {
        match self {
            ConsumerError::Fetch { stats, .. } | ConsumerError::Rewind { stats, .. } => stats,
        }
    }
}
