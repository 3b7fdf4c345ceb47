use std::collections::BTreeMap;
use std::sync::RwLock;

use sig_types::{ApiSnapshot, SnapshotDigest};

use crate::error::StoreResult;
use crate::traits::{validate_label, SnapshotStore};

/// In-memory snapshot store.
///
/// Intended for tests and embedding. Snapshots are held behind a `RwLock`
/// and cloned on read/write.
pub struct InMemorySnapshotStore {
    snapshots: RwLock<BTreeMap<String, ApiSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of snapshots currently stored.
    pub fn len(&self) -> usize {
        self.snapshots.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.read().expect("lock poisoned").is_empty()
    }

    pub fn clear(&self) {
        self.snapshots.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn read(&self, label: &str) -> StoreResult<Option<ApiSnapshot>> {
        let map = self.snapshots.read().expect("lock poisoned");
        Ok(map.get(label).cloned())
    }

    fn write(&self, snapshot: &ApiSnapshot) -> StoreResult<SnapshotDigest> {
        let label = snapshot.label();
        validate_label(&label)?;
        snapshot.validate()?;
        let digest = snapshot.digest()?;
        let mut map = self.snapshots.write().expect("lock poisoned");
        map.insert(label, snapshot.clone());
        Ok(digest)
    }

    fn exists(&self, label: &str) -> StoreResult<bool> {
        let map = self.snapshots.read().expect("lock poisoned");
        Ok(map.contains_key(label))
    }

    fn delete(&self, label: &str) -> StoreResult<bool> {
        let mut map = self.snapshots.write().expect("lock poisoned");
        Ok(map.remove(label).is_some())
    }

    fn labels(&self) -> StoreResult<Vec<String>> {
        let map = self.snapshots.read().expect("lock poisoned");
        Ok(map.keys().cloned().collect())
    }
}

impl std::fmt::Debug for InMemorySnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySnapshotStore")
            .field("snapshot_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use sig_types::{ClassDecl, ClassKind, Package, TypeError};

    fn snapshot(version: &str) -> ApiSnapshot {
        ApiSnapshot::new("android", version).with_package(
            Package::new("android.app").with_class(ClassDecl::new("Activity", ClassKind::Class)),
        )
    }

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[test]
    fn write_and_read() {
        let store = InMemorySnapshotStore::new();
        let snap = snapshot("33");
        let digest = store.write(&snap).unwrap();
        assert_eq!(digest, snap.digest().unwrap());

        let read_back = store.read("android-33").unwrap().expect("should exist");
        assert_eq!(read_back, snap);
    }

    #[test]
    fn read_missing_returns_none() {
        let store = InMemorySnapshotStore::new();
        assert!(store.read("android-1").unwrap().is_none());
        assert!(matches!(store.get("android-1"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn write_replaces_same_label() {
        let store = InMemorySnapshotStore::new();
        store.write(&snapshot("33")).unwrap();
        let replacement = ApiSnapshot::new("android", "33");
        store.write(&replacement).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("android-33").unwrap(), replacement);
    }

    // -----------------------------------------------------------------------
    // Exists / Delete / Labels
    // -----------------------------------------------------------------------

    #[test]
    fn exists_and_delete() {
        let store = InMemorySnapshotStore::new();
        store.write(&snapshot("33")).unwrap();
        assert!(store.exists("android-33").unwrap());
        assert!(store.delete("android-33").unwrap());
        assert!(!store.exists("android-33").unwrap());
        assert!(!store.delete("android-33").unwrap());
    }

    #[test]
    fn labels_are_sorted() {
        let store = InMemorySnapshotStore::new();
        store.write(&snapshot("34")).unwrap();
        store.write(&snapshot("33")).unwrap();
        assert_eq!(store.labels().unwrap(), vec!["android-33", "android-34"]);
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn invalid_snapshot_is_rejected() {
        let store = InMemorySnapshotStore::new();
        let dup = ApiSnapshot::new("android", "1")
            .with_package(Package::new("a"))
            .with_package(Package::new("a"));
        let err = store.write(&dup).unwrap_err();
        assert!(matches!(err, StoreError::Snapshot(TypeError::Duplicate { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn invalid_label_is_rejected() {
        let store = InMemorySnapshotStore::new();
        let err = store.write(&ApiSnapshot::new("my lib", "1")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidLabel { .. }));
    }

    // -----------------------------------------------------------------------
    // Concurrency / Debug
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemorySnapshotStore::new());
        store.write(&snapshot("33")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let snap = store.read("android-33").unwrap();
                    assert_eq!(snap.map(|s| s.class_count()), Some(1));
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
    }

    #[test]
    fn debug_format() {
        let store = InMemorySnapshotStore::default();
        store.write(&snapshot("1")).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemorySnapshotStore"));
        assert!(debug.contains("snapshot_count: 1"));
    }
}
