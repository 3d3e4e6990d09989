/// Failure decoding broker headers into a carrier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CarrierError {
    /// Propagation values are text; anything else is rejected rather than guessed at.
    #[error("header {key:?} has a non-UTF-8 value")]
    NonUtf8Value { key: String },
}
