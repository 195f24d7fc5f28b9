use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use rw_types::normalize_date;

use crate::entry::HistoryEntry;
use crate::merge::{merge_history, MergePolicy};

/// The cumulative change ledger.
///
/// Deserialization is tolerant: a bare array is read as the rows of a ledger
/// that was never seeded, rows that are not objects are skipped, and any other
/// top-level shape reads as an empty ledger.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Ledger {
    /// Cutoff (`YYYYMMDD`) the ledger was seeded from.
    pub seeded_from: Option<String>,
    /// Run timestamp of the last write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_generated_at_utc: Option<String>,
    pub items: Vec<HistoryEntry>,
}

impl Ledger {
    /// Interpret a decoded ledger document of any known shape.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(rows) => Self {
                items: rows_from_values(rows),
                ..Self::default()
            },
            Value::Object(mut map) => {
                let items = match map.remove("items") {
                    Some(Value::Array(rows)) => rows_from_values(rows),
                    _ => Vec::new(),
                };
                Self {
                    seeded_from: scalar(map.remove("seeded_from"))
                        .map(|s| normalize_date(&s))
                        .filter(|s| !s.is_empty()),
                    last_generated_at_utc: scalar(map.remove("last_generated_at_utc")),
                    items,
                }
            }
            _ => Self::default(),
        }
    }

    /// Merge a run's delta rows and stamp the run.
    ///
    /// A ledger that was never seeded is marked seeded from the cutoff.
    pub fn record_run(
        &mut self,
        delta: Vec<HistoryEntry>,
        policy: &MergePolicy,
        generated_at_utc: &str,
    ) {
        let existing = std::mem::take(&mut self.items);
        self.items = merge_history(existing, delta, policy);
        if self.seeded_from.is_none() {
            self.seeded_from = Some(policy.cutoff().to_string());
        }
        self.last_generated_at_utc = Some(generated_at_utc.to_string());
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the ledger holds no rows.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'de> Deserialize<'de> for Ledger {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Value::deserialize(d).map(Ledger::from_value)
    }
}

fn rows_from_values(rows: Vec<Value>) -> Vec<HistoryEntry> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<HistoryEntry>(row) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(index, error = %e, "unreadable ledger row skipped");
                None
            }
        })
        .collect()
}

fn scalar(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
