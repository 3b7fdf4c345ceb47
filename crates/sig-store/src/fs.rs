use std::fs;
use std::path::{Path, PathBuf};

use sig_types::{ApiSnapshot, SnapshotDigest};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::load::{parse_snapshot, SnapshotFormat};
use crate::traits::{validate_label, SnapshotStore};

const EXTENSION: &str = "json";

/// Directory-backed snapshot store: one `<label>.json` file per snapshot.
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    root: PathBuf,
}

impl FsSnapshotStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened snapshot store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, label: &str) -> PathBuf {
        self.root.join(format!("{label}.{EXTENSION}"))
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn read(&self, label: &str) -> StoreResult<Option<ApiSnapshot>> {
        validate_label(label)?;
        let path = self.path_for(label);
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        let snapshot = parse_snapshot(&text, SnapshotFormat::Json, &path.display().to_string())?;
        Ok(Some(snapshot))
    }

    fn write(&self, snapshot: &ApiSnapshot) -> StoreResult<SnapshotDigest> {
        let label = snapshot.label();
        validate_label(&label)?;
        snapshot.validate()?;
        let digest = snapshot.digest()?;

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        // Write to a sibling temp file, then rename over the target.
        let path = self.path_for(&label);
        let tmp = self.root.join(format!(".{label}.{EXTENSION}.tmp"));
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!(path = %tmp.display(), "cannot remove temp file: {}", cleanup);
            }
            return Err(e.into());
        }

        debug!(label = %label, digest = %digest, "stored snapshot");
        Ok(digest)
    }

    fn exists(&self, label: &str) -> StoreResult<bool> {
        validate_label(label)?;
        Ok(self.path_for(label).is_file())
    }

    fn delete(&self, label: &str) -> StoreResult<bool> {
        validate_label(label)?;
        let path = self.path_for(label);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }

    fn labels(&self) -> StoreResult<Vec<String>> {
        let mut labels = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable store entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION)
            {
                continue;
            }
            let Some(label) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!("skipping store entry with non-UTF-8 name: {:?}", path);
                continue;
            };
            if validate_label(label).is_err() {
                warn!("skipping store entry with invalid label: {:?}", path);
                continue;
            }
            labels.push(label.to_string());
        }
        labels.sort();
        Ok(labels)
    }
}
