//! Published run artifacts.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use rw_index::ChangeItem;
use rw_ledger::HistoryEntry;
use rw_store::write_json_atomic;
use rw_types::{date_sort_value, RecordKind};

use crate::error::SdkResult;

pub const SNAPSHOT_FILE: &str = "updates.json";
pub const CHANGES_FILE: &str = "changes.json";
pub const CHANGELOG_FILE: &str = "changelog.json";
pub const HEALTH_FILE: &str = "health.json";

/// The current snapshot: everything seen this run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotArtifact {
    pub run_id: String,
    pub generated_at_kst: String,
    pub generated_at_utc: String,
    pub stats: SnapshotStats,
    pub items: Vec<ChangeItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub count_by_kind: BTreeMap<String, usize>,
    /// Keyed by state section (`laws`, `admruls`, `bills`).
    pub fallback: BTreeMap<String, bool>,
    pub delta_count_this_run: usize,
    pub cumulative_history_total: usize,
    pub history_start_yyyymmdd: String,
}

/// The cumulative change log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangelogArtifact {
    pub generated_at_kst: String,
    pub generated_at_utc: String,
    pub range_start_yyyymmdd: String,
    pub stats: ChangelogStats,
    pub items: Vec<HistoryEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangelogStats {
    pub count_by_kind: BTreeMap<String, usize>,
    pub delta_count_this_run: usize,
    pub total_cumulative: usize,
    pub seeded_now: bool,
}

/// Liveness marker read by the delay check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthArtifact {
    #[serde(default)]
    pub last_success_kst: String,
    #[serde(default)]
    pub last_success_utc: String,
}

/// Collapse repeated reports of the same item (same kind, title and id),
/// keeping the highest-ranked status; among equals the first report wins.
/// First-seen order is preserved.
pub fn dedupe_items(items: Vec<ChangeItem>) -> Vec<ChangeItem> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<ChangeItem> = Vec::with_capacity(items.len());
    for item in items {
        let key = item.dedupe_key();
        match index.get(&key) {
            Some(&at) => {
                if item.status.rank() > out[at].status.rank() {
                    out[at] = item;
                }
            }
            None => {
                index.insert(key, out.len());
                out.push(item);
            }
        }
    }
    out
}

/// Snapshot order: kind (statute, notice, bill), newest date, title.
pub fn sort_items(items: &mut [ChangeItem]) {
    items.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| date_sort_value(&b.date).cmp(&date_sort_value(&a.date)))
            .then_with(|| a.title.cmp(&b.title))
    });
}

/// Count items per kind label; every kind is present, unknown labels are
/// ignored.
pub fn count_by_kind<'a>(labels: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = RecordKind::ALL
        .iter()
        .map(|k| (k.label().to_string(), 0))
        .collect();
    for label in labels {
        if let Some(n) = counts.get_mut(label) {
            *n += 1;
        }
    }
    counts
}

/// Write the snapshot, the change log (and its legacy mirror), in that order.
pub fn write_artifacts(
    out_dir: &Path,
    snapshot: &SnapshotArtifact,
    changelog: &ChangelogArtifact,
) -> SdkResult<()> {
    write_json_atomic(&out_dir.join(SNAPSHOT_FILE), snapshot)?;
    write_json_atomic(&out_dir.join(CHANGES_FILE), changelog)?;
    write_json_atomic(&out_dir.join(CHANGELOG_FILE), changelog)?;
    Ok(())
}

/// Write the health marker.
pub fn write_health(out_dir: &Path, health: &HealthArtifact) -> SdkResult<()> {
    write_json_atomic(&out_dir.join(HEALTH_FILE), health)?;
    Ok(())
}
