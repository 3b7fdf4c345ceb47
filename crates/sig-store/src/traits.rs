use sig_types::{ApiSnapshot, SnapshotDigest};

use crate::error::{StoreError, StoreResult};

/// Label-keyed snapshot store.
///
/// A snapshot is stored under its label (`name-version`). Writing a snapshot
/// whose label already exists replaces the stored copy.
pub trait SnapshotStore: Send + Sync {
    /// Read a snapshot by label.
    ///
    /// Returns `Ok(None)` if no snapshot has that label.
    fn read(&self, label: &str) -> StoreResult<Option<ApiSnapshot>>;

    /// Validate and store a snapshot, returning its digest.
    fn write(&self, snapshot: &ApiSnapshot) -> StoreResult<SnapshotDigest>;

    fn exists(&self, label: &str) -> StoreResult<bool>;

    /// Delete a snapshot by label. Returns `true` if it existed.
    fn delete(&self, label: &str) -> StoreResult<bool>;

    /// All stored labels, sorted.
    fn labels(&self) -> StoreResult<Vec<String>>;

    /// Like [`read`](Self::read), but a missing label is an error.
    fn get(&self, label: &str) -> StoreResult<ApiSnapshot> {
        self.read(label)?
            .ok_or_else(|| StoreError::NotFound(label.to_string()))
    }
}

const FORBIDDEN_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Check that a label can be used as a storage key and file stem.
pub fn validate_label(label: &str) -> StoreResult<()> {
    let invalid = |reason: &str| {
        Err(StoreError::InvalidLabel {
            label: label.to_string(),
            reason: reason.to_string(),
        })
    };

    if label.is_empty() {
        return invalid("label must not be empty");
    }
    if label.starts_with('.') {
        return invalid("label must not start with '.'");
    }
    if label.contains("..") {
        return invalid("label must not contain '..'");
    }
    if let Some(ch) = label
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_CHARS.contains(c))
    {
        return invalid(&format!("contains forbidden character: {ch:?}"));
    }
    Ok(())
}
