use sig_types::TypeError;

/// Errors from snapshot storage and loading.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No snapshot is stored under the label.
    #[error("snapshot not found: {0}")]
    NotFound(String),

    /// The label cannot be used as a storage key.
    #[error("invalid label {label:?}: {reason}")]
    InvalidLabel { label: String, reason: String },

    /// A snapshot file could not be decoded.
    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    /// The file extension is neither `.json` nor `.toml`.
    #[error("unsupported snapshot format: {0}")]
    UnsupportedFormat(String),

    /// Serialization failure on write.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The snapshot failed validation or could not be digested.
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] TypeError),

    /// I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
