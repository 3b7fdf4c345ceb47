//! Loading snapshot files from disk.

use std::fmt;
use std::fs;
use std::path::Path;

use sig_types::ApiSnapshot;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// On-disk encoding of a snapshot file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Toml,
}

impl SnapshotFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> StoreResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(StoreError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Toml => write!(f, "toml"),
        }
    }
}

/// Decode and validate a snapshot from text.
///
/// `origin` names the source in error messages.
pub fn parse_snapshot(text: &str, format: SnapshotFormat, origin: &str) -> StoreResult<ApiSnapshot> {
    let parse_err = |reason: String| StoreError::Parse {
        path: origin.to_string(),
        reason,
    };
    let snapshot: ApiSnapshot = match format {
        SnapshotFormat::Json => serde_json::from_str(text).map_err(|e| parse_err(e.to_string()))?,
        SnapshotFormat::Toml => toml::from_str(text).map_err(|e| parse_err(e.to_string()))?,
    };
    snapshot.validate()?;
    Ok(snapshot)
}

/// Read a `.json` or `.toml` snapshot file and validate it.
pub fn load_snapshot(path: &Path) -> StoreResult<ApiSnapshot> {
    let format = SnapshotFormat::from_path(path)?;
    let text = fs::read_to_string(path)?;
    let snapshot = parse_snapshot(&text, format, &path.display().to_string())?;
    debug!(
        path = %path.display(),
        %format,
        label = %snapshot.label(),
        classes = snapshot.class_count(),
        "loaded snapshot"
    );
    Ok(snapshot)
}
