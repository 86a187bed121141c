//! Versioned snapshot persistence.
//!
//! The persisted subset of store state — tasks, tags, view mode, user name —
//! serialized as a single JSON document. The same document doubles as the
//! user-facing backup export. Filters and UI-selection state are
//! deliberately excluded.
//!
//! Dates round-trip as ISO-8601 strings via chrono's serde support; the live
//! store only ever holds parsed date values.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::store::TaskStore;
use crate::types::{Tag, Task, ViewMode};

/// Bumped when the snapshot document shape changes.
pub const SCHEMA_VERSION: i32 = 1;

/// Export format version (semver).
pub const EXPORT_VERSION: &str = "1.0.0";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A persisted snapshot of the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub schema_version: i32,
    pub export_version: String,
    /// ISO 8601 timestamp of when the snapshot was written.
    pub exported_at: String,
    /// Tool name and version that created this snapshot.
    pub exported_by: String,
    pub tasks: Vec<Task>,
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default = "default_user_name")]
    pub user_name: String,
}

fn default_user_name() -> String {
    "there".into()
}

impl Snapshot {
    /// Capture the persisted fields of a store with current metadata.
    pub fn from_store(store: &TaskStore) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            export_version: EXPORT_VERSION.to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            exported_by: format!("kanvax v{}", env!("CARGO_PKG_VERSION")),
            tasks: store.tasks().to_vec(),
            tags: store.tags().to_vec(),
            view_mode: store.view_mode(),
            user_name: store.user_name().to_string(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a snapshot from a file (plain JSON or gzip, sniffed by magic
    /// bytes).
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 2];
        reader.read_exact(&mut magic)?;

        // Reopen from the start now that we know the encoding.
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        if magic == [0x1f, 0x8b] {
            let decoder = flate2::read::GzDecoder::new(reader);
            Ok(serde_json::from_reader(decoder)?)
        } else {
            Ok(serde_json::from_reader(reader)?)
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the snapshot to `path`, creating parent directories as needed.
    /// Compresses when `gzip` is set or the filename ends in `.gz`.
    pub fn write_to_file(&self, path: &Path, gzip: bool) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json_pretty()?;
        let compress = gzip || path.extension().is_some_and(|ext| ext == "gz");
        let mut file = File::create(path)?;
        if compress {
            let mut encoder =
                flate2::write::GzEncoder::new(&mut file, flate2::Compression::default());
            encoder.write_all(json.as_bytes())?;
            encoder.finish()?;
        } else {
            file.write_all(json.as_bytes())?;
        }
        Ok(())
    }

    /// Rebuild a store from this snapshot. Filters and selection state come
    /// back at their defaults.
    pub fn into_store(self) -> TaskStore {
        TaskStore::from_parts(self.tasks, self.tags, self.view_mode, self.user_name)
    }

    /// True when this snapshot was written by the current schema.
    pub fn is_schema_compatible(&self) -> bool {
        self.schema_version == SCHEMA_VERSION
    }
}

/// Persist the store's snapshot to `path`.
pub fn save(store: &TaskStore, path: &Path) -> Result<(), SnapshotError> {
    Snapshot::from_store(store).write_to_file(path, false)
}

/// Load the store from `path`, falling back to the built-in seed dataset
/// when the file is missing, unreadable, or corrupt. Never returns an empty
/// un-recoverable store by accident.
pub fn load_or_seed(path: &Path) -> TaskStore {
    if !path.exists() {
        info!(path = %path.display(), "no snapshot found, starting from seed data");
        return TaskStore::with_seed_data();
    }
    match Snapshot::from_file(path) {
        Ok(snapshot) => {
            if !snapshot.is_schema_compatible() {
                warn!(
                    found = snapshot.schema_version,
                    expected = SCHEMA_VERSION,
                    "snapshot schema version mismatch, loading anyway"
                );
            }
            info!(
                path = %path.display(),
                tasks = snapshot.tasks.len(),
                tags = snapshot.tags.len(),
                "snapshot loaded"
            );
            snapshot.into_store()
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "snapshot unreadable, starting from seed data"
            );
            TaskStore::with_seed_data()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_metadata_defaults() {
        let store = TaskStore::with_seed_data();
        let snapshot = Snapshot::from_store(&store);
        assert_eq!(snapshot.schema_version, SCHEMA_VERSION);
        assert_eq!(snapshot.export_version, EXPORT_VERSION);
        assert!(snapshot.exported_by.starts_with("kanvax v"));
        assert_eq!(snapshot.tasks.len(), 7);
    }

    #[test]
    fn snapshot_json_roundtrip_preserves_tasks() {
        let store = TaskStore::with_seed_data();
        let snapshot = Snapshot::from_store(&store);
        let json = snapshot.to_json_pretty().unwrap();
        let loaded = Snapshot::from_json(&json).unwrap();
        assert_eq!(loaded.tasks, snapshot.tasks);
        assert_eq!(loaded.tags, snapshot.tags);
        assert_eq!(loaded.user_name, snapshot.user_name);
    }

    #[test]
    fn snapshot_omits_filters() {
        let mut store = TaskStore::with_seed_data();
        store.set_filters(crate::types::FilterPatch {
            search: Some("hidden".into()),
            ..Default::default()
        });
        let json = Snapshot::from_store(&store).to_json_pretty().unwrap();
        assert!(!json.contains("\"filters\""));
        assert!(!json.contains("selectedTaskId"));
    }
}
