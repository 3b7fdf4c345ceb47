use thiserror::Error;

/// Errors produced by snapshot model operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unknown modifier: {0}")]
    UnknownModifier(String),

    #[error("unknown visibility: {0}")]
    UnknownVisibility(String),

    #[error("invalid type reference `{input}`: {reason}")]
    InvalidTypeRef { input: String, reason: String },

    #[error("duplicate {scope} `{key}`")]
    Duplicate { scope: String, key: String },
}
