//! JSON snapshot of the user registry
//!
//! The whole registry is written as one JSON document after every change and
//! read back once at startup. Writes go to a sibling temp file first and are
//! renamed into place, so a crash mid-write leaves the previous snapshot intact.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{FileKind, FileRef, Lang, UserId};

/// Snapshot read/write errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A stored document reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub file: FileRef,
    pub kind: FileKind,
}

/// Persistent shape of the registry
///
/// Every field defaults to empty, so snapshots written by older versions
/// (or hand-edited ones missing a section) still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub users: BTreeSet<UserId>,
    pub blocked_users: BTreeSet<UserId>,
    pub daily_users: BTreeMap<NaiveDate, BTreeSet<UserId>>,
    pub registered_users: BTreeMap<UserId, BTreeMap<String, String>>,
    pub user_documents: BTreeMap<UserId, Vec<StoredDocument>>,
    pub user_languages: BTreeMap<UserId, Lang>,
}

/// Where snapshots are kept
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: Option<PathBuf>,
}

impl SnapshotStore {
    /// File-backed store
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()) }
    }

    /// Store that keeps nothing; `load` is always empty and `save` is a no-op
    pub fn in_memory() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads the snapshot.
    ///
    /// A missing file yields an empty snapshot. An unreadable or corrupt file is
    /// moved aside to `<file>.corrupt-<timestamp>` and an empty snapshot is
    /// returned, so the bot keeps running with a fresh registry.
    pub fn load(&self) -> Result<Snapshot, SnapshotError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(Snapshot::default());
        };

        if !path.exists() {
            log::info!("No snapshot at {}, starting with an empty registry", path.display());
            return Ok(Snapshot::default());
        }

        let raw = fs::read(path)?;
        match serde_json::from_slice::<Snapshot>(&raw) {
            Ok(snapshot) => {
                log::info!(
                    "Loaded snapshot from {}: {} users, {} registered, {} blocked",
                    path.display(),
                    snapshot.users.len(),
                    snapshot.registered_users.len(),
                    snapshot.blocked_users.len()
                );
                Ok(snapshot)
            }
            Err(e) => {
                let quarantine = quarantine_path(path);
                log::error!(
                    "Snapshot {} is corrupt ({}), moving it to {} and starting empty",
                    path.display(),
                    e,
                    quarantine.display()
                );
                if let Err(e) = fs::rename(path, &quarantine) {
                    log::error!("Failed to move corrupt snapshot aside: {}", e);
                }
                Ok(Snapshot::default())
            }
        }
    }

    /// Writes the snapshot atomically (temp file + rename).
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn quarantine_path(path: &Path) -> PathBuf {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".corrupt-{}", timestamp));
    PathBuf::from(name)
}
