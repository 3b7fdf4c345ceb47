//! Error types for the delta crate.

use sig_types::TypeError;

/// Errors that can occur while building or emitting deltas.
#[derive(Debug, thiserror::Error)]
pub enum DeltaError {
    /// A delta was requested with neither a `from` nor a `to` value.
    #[error("a delta needs at least one of `from` or `to`")]
    EmptyDelta,

    /// A snapshot model operation failed (digest, validation).
    #[error("snapshot error: {0}")]
    Type(#[from] TypeError),

    /// The comparison configuration could not be parsed or written.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization of a delta tree failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for delta results.
pub type DeltaResult<T> = Result<T, DeltaError>;
