/// Error type for order persistence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository lock poisoned during {0}")]
    LockPoisoned(&'static str),
    /// Storage could not be reached
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The insert statement failed
    #[error("query failed: {0}")]
    Query(String),
    /// Storage returned an id that cannot identify an order
    #[error("storage returned invalid order id {0}")]
    InvalidId(i64),
}
