use thiserror::Error;

/// Invariant violations raised by the codec core.
///
/// Every variant names the broken invariant so that callers can surface it
/// verbatim instead of a generic failure message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Invalid chunk bits: {0} (must be between 1 and 16)")]
    InvalidChunkBits(u8),

    #[error("Invalid chunk bits {0:?}: not a number")]
    UnparsableChunkBits(String),

    #[error("Invalid chunk size: {0} (must be at least 1 symbol)")]
    InvalidChunkSize(usize),

    #[error("Invalid segment size: {0} (must be at least 1 byte)")]
    InvalidSegmentSize(usize),

    #[error("Invalid symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    #[error("Malformed artifact name: {0}")]
    MalformedName(String),

    #[error("Duplicate artifact index: {0}")]
    DuplicateIndex(u64),

    #[error("Missing artifact index: {0}")]
    MissingIndex(u64),

    #[error("Truncated data: {0}")]
    TruncatedData(String),
}
