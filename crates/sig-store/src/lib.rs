//! Snapshot storage for sigdiff.
//!
//! Snapshots are stored under their label (`name-version`) so the CLI can
//! compare releases by name instead of by file path.
//!
//! # Storage Backends
//!
//! All backends implement the [`SnapshotStore`] trait:
//!
//! - [`InMemorySnapshotStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FsSnapshotStore`] -- one JSON file per snapshot in a directory
//!
//! Loose snapshot files are read with [`load_snapshot`].

pub mod error;
pub mod fs;
pub mod load;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsSnapshotStore;
pub use load::{load_snapshot, parse_snapshot, SnapshotFormat};
pub use memory::InMemorySnapshotStore;
pub use traits::{validate_label, SnapshotStore};
