use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::record::StateSnapshot;
use crate::traits::StateStore;

/// In-memory state store.
///
/// Intended for tests and embedding. The snapshot is cloned on load and save.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    state: RwLock<Option<StateSnapshot>>,
}

impl InMemoryStateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `state`.
    pub fn with_state(state: StateSnapshot) -> Self {
        Self {
            state: RwLock::new(Some(state)),
        }
    }

    /// Returns `true` once a snapshot has been saved.
    pub fn has_saved(&self) -> bool {
        self.state.read().map(|s| s.is_some()).unwrap_or(false)
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self) -> StoreResult<StateSnapshot> {
        let guard = self
            .state
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(guard.clone().unwrap_or_default())
    }

    fn save(&self, state: &StateSnapshot) -> StoreResult<()> {
        let mut guard = self
            .state
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        *guard = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use rw_types::RecordKind;

    use super::*;
    use crate::record::StateRecord;

    #[test]
    fn fresh_store_is_empty() {
        let store = InMemoryStateStore::new();
        assert!(!store.has_saved());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_is_visible_to_load() {
        let store = InMemoryStateStore::new();
        let mut snap = StateSnapshot::new();
        snap.upsert(RecordKind::Notice, "고시::1", StateRecord::new("a|b|1", Map::new()));
        store.save(&snap).unwrap();
        assert!(store.has_saved());
        assert_eq!(store.load().unwrap(), snap);
    }
}
