use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::atomic::{read_if_exists, write_json_atomic};
use crate::error::StoreResult;
use crate::record::StateSnapshot;
use crate::traits::StateStore;

/// State store backed by a single JSON file.
///
/// Saves replace the file atomically; see [`write_json_atomic`].
#[derive(Clone, Debug)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store persisting to `path`. Nothing is touched until the
    /// first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> StoreResult<StateSnapshot> {
        let Some(text) = read_if_exists(&self.path)? else {
            debug!(path = %self.path.display(), "no prior state, starting fresh");
            return Ok(StateSnapshot::new());
        };
        match serde_json::from_str::<StateSnapshot>(&text) {
            Ok(state) => {
                debug!(path = %self.path.display(), records = state.len(), "state loaded");
                Ok(state)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "state file unparseable, starting fresh");
                Ok(StateSnapshot::new())
            }
        }
    }

    fn save(&self, state: &StateSnapshot) -> StoreResult<()> {
        write_json_atomic(&self.path, state)?;
        debug!(path = %self.path.display(), records = state.len(), "state saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use serde_json::{json, Map};

    use rw_types::RecordKind;

    use super::*;
    use crate::record::StateRecord;

    fn sample() -> StateSnapshot {
        let mut payload = Map::new();
        payload.insert("law_name".into(), json!("대기환경보전법"));
        payload.insert("ld".into(), json!("20240101"));
        let mut snap = StateSnapshot::new();
        snap.upsert(
            RecordKind::Statute,
            "대기환경보전법",
            StateRecord::new("20240101|1|개정", payload).seen_at("2024-01-02T00:00:00.000Z"),
        );
        snap.last_run = Some("2024-01-02T09:00:00+09:00".into());
        snap
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("state.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("nested").join("state.json"));
        let snap = sample();
        store.save(&snap).unwrap();
        assert_eq!(store.load().unwrap(), snap);
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{\"laws\": {\"x\": ").unwrap();
        let store = FileStateStore::new(&path);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn interrupted_write_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = FileStateStore::new(&path);
        let snap = sample();
        store.save(&snap).unwrap();

        // A writer that died before the rename leaves only a partial temp file.
        let mut partial = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
        partial.write_all(b"{\"laws\": {\"trunc").unwrap();
        let (_file, _kept) = partial.keep().unwrap();

        assert_eq!(store.load().unwrap(), snap);
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("state.json"));
        store.save(&sample()).unwrap();
        let mut next = sample();
        next.upsert(RecordKind::Bill, "PRC_A", StateRecord::new("1|2|3", Map::new()));
        store.save(&next).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.get(RecordKind::Bill, "PRC_A").is_some());
    }
}
