use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Errors produced by the object codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The object could not be serialized.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The bytes are not a valid encoded object.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
