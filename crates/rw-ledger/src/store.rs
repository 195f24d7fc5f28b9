use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use rw_store::{read_if_exists, write_json_atomic};

use crate::error::LedgerResult;
use crate::ledger::Ledger;

/// JSON persistence for the ledger.
///
/// Saves replace the file atomically. When the primary file does not exist,
/// loading falls back to a legacy path (an older change-log export) if one is
/// configured.
#[derive(Clone, Debug)]
pub struct LedgerStore {
    path: PathBuf,
    legacy_path: Option<PathBuf>,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            legacy_path: None,
        }
    }

    /// Read from `legacy` when the primary file is absent.
    pub fn with_legacy_path(mut self, legacy: impl Into<PathBuf>) -> Self {
        self.legacy_path = Some(legacy.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger. Absent or unparseable content loads as empty.
    pub fn load(&self) -> LedgerResult<Ledger> {
        let mut source = self.path.as_path();
        let mut text = read_if_exists(source)?;
        if text.is_none() {
            if let Some(legacy) = &self.legacy_path {
                source = legacy.as_path();
                text = read_if_exists(source)?;
            }
        }
        let Some(text) = text else {
            debug!(path = %self.path.display(), "no ledger yet");
            return Ok(Ledger::default());
        };
        match serde_json::from_str::<Ledger>(&text) {
            Ok(ledger) => {
                debug!(path = %source.display(), rows = ledger.len(), "ledger loaded");
                Ok(ledger)
            }
            Err(e) => {
                warn!(path = %source.display(), error = %e, "ledger unparseable, starting empty");
                Ok(Ledger::default())
            }
        }
    }

    /// Durably replace the ledger file.
    pub fn save(&self, ledger: &Ledger) -> LedgerResult<()> {
        write_json_atomic(&self.path, ledger)?;
        debug!(path = %self.path.display(), rows = ledger.len(), "ledger saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::HistoryEntry;
    use std::fs;

    fn row(id: &str) -> HistoryEntry {
        let mut e = HistoryEntry {
            kind: "의안".into(),
            id: id.into(),
            title: "t".into(),
            date: "20240101".into(),
            ..Default::default()
        };
        e.normalize("2024-01-01T00:00:00Z");
        e
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("data").join("history.json"));
        let ledger = Ledger {
            seeded_from: Some("20210101".into()),
            last_generated_at_utc: Some("2024-01-02T00:00:00.000Z".into()),
            items: vec![row("1"), row("2")],
        };
        store.save(&ledger).unwrap();
        assert_eq!(store.load().unwrap(), ledger);
    }

    #[test]
    fn falls_back_to_legacy_changelog() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = dir.path().join("changelog.json");
        fs::write(&legacy, serde_json::to_string(&vec![row("L")]).unwrap()).unwrap();
        let store = LedgerStore::new(dir.path().join("history.json")).with_legacy_path(&legacy);
        let ledger = store.load().unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(ledger.seeded_from.is_none());
    }

    #[test]
    fn primary_file_shadows_legacy() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = dir.path().join("changelog.json");
        fs::write(&legacy, serde_json::to_string(&vec![row("L")]).unwrap()).unwrap();
        let store = LedgerStore::new(dir.path().join("history.json")).with_legacy_path(&legacy);
        store.save(&Ledger::default()).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_ledger_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{\"items\": [").unwrap();
        assert!(LedgerStore::new(&path).load().unwrap().is_empty());
    }
}
