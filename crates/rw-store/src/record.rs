use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use rw_types::RecordKind;

/// Last-known state of one identity key.
///
/// The payload is flattened next to `status_key`, so the persisted shape is
/// `{"status_key": "...", "last_seen": "...", <payload fields>}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Fingerprint of the record when it was last seen.
    #[serde(default)]
    pub status_key: String,
    /// Run timestamp (UTC ISO) of the last sighting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
    /// Full normalized payload of the record.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl StateRecord {
    /// Create a record from a fingerprint and payload.
    pub fn new(status_key: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            status_key: status_key.into(),
            last_seen: None,
            payload,
        }
    }

    /// Stamp the record with the sighting time.
    pub fn seen_at(mut self, at: impl Into<String>) -> Self {
        self.last_seen = Some(at.into());
        self
    }

    /// A string payload field, if present and non-empty.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.payload
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// The whole persisted state: one section per record kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub laws: BTreeMap<String, StateRecord>,
    #[serde(default)]
    pub admruls: BTreeMap<String, StateRecord>,
    #[serde(default)]
    pub bills: BTreeMap<String, StateRecord>,
    /// KST ISO timestamp of the last completed run.
    #[serde(default)]
    pub last_run: Option<String>,
}

impl StateSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The section holding records of `kind`.
    pub fn section(&self, kind: RecordKind) -> &BTreeMap<String, StateRecord> {
        match kind {
            RecordKind::Statute => &self.laws,
            RecordKind::Notice => &self.admruls,
            RecordKind::Bill => &self.bills,
        }
    }

    /// Mutable access to the section holding records of `kind`.
    pub fn section_mut(&mut self, kind: RecordKind) -> &mut BTreeMap<String, StateRecord> {
        match kind {
            RecordKind::Statute => &mut self.laws,
            RecordKind::Notice => &mut self.admruls,
            RecordKind::Bill => &mut self.bills,
        }
    }

    /// Look up the prior record for an identity key.
    pub fn get(&self, kind: RecordKind, key: &str) -> Option<&StateRecord> {
        self.section(kind).get(key)
    }

    /// Insert or overwrite a record; returns the previous one.
    pub fn upsert(
        &mut self,
        kind: RecordKind,
        key: impl Into<String>,
        record: StateRecord,
    ) -> Option<StateRecord> {
        self.section_mut(kind).insert(key.into(), record)
    }

    /// Total number of records across all kinds.
    pub fn len(&self) -> usize {
        self.laws.len() + self.admruls.len() + self.bills.len()
    }

    /// Returns `true` if no kind holds any record.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
