//! Persistence layer

pub mod snapshot;

pub use snapshot::{Snapshot, SnapshotError, SnapshotStore, StoredDocument};
