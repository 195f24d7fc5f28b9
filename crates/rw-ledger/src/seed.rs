//! One-time historical backfill of the ledger.

use tracing::info;

use rw_index::ChangeItem;
use rw_records::Record;
use rw_types::{date_sort_value, normalize_date, ChangeStatus};

use crate::entry::{EntrySource, HistoryEntry};
use crate::ledger::Ledger;
use crate::merge::{merge_history, MergePolicy};

/// Change summary attached to backfilled rows.
pub fn backfill_summary(cutoff: &str) -> String {
    let d = normalize_date(cutoff);
    if d.len() == 8 {
        format!("기준일({}-{}-{}) 이후 누적 백필", &d[0..4], &d[4..6], &d[6..8])
    } else {
        format!("기준일({d}) 이후 누적 백필")
    }
}

/// Returns `true` if the ledger has to be (re)seeded for `cutoff`: it is
/// empty, was never seeded, or was seeded from a later date than `cutoff`.
pub fn needs_seed(ledger: &Ledger, cutoff: &str) -> bool {
    if ledger.items.is_empty() {
        return true;
    }
    match ledger.seeded_from.as_deref().map(normalize_date) {
        None => true,
        Some(seeded) if seeded.is_empty() => true,
        Some(seeded) => date_sort_value(&seeded) > date_sort_value(cutoff),
    }
}

/// A reconstructed ledger row for a historical record: status MOD, source
/// backfill, detected at midnight of the record's date.
pub fn backfill_entry(record: &Record, policy: &MergePolicy) -> HistoryEntry {
    let mut item = ChangeItem::from_record(record, ChangeStatus::Modified);
    item.change_summary = Some(backfill_summary(policy.cutoff()));
    HistoryEntry::from_change_item(&item, EntrySource::Backfill, policy.fallback_detected_at())
}

/// Merge `backfill` into the ledger and mark it seeded from the cutoff.
///
/// Rows of a ledger that was never seeded are not carried over; the seed
/// replaces them.
pub fn apply_seed(ledger: &mut Ledger, backfill: Vec<HistoryEntry>, policy: &MergePolicy) {
    let was_seeded = ledger
        .seeded_from
        .as_deref()
        .is_some_and(|s| !normalize_date(s).is_empty());
    let base = if was_seeded {
        std::mem::take(&mut ledger.items)
    } else {
        Vec::new()
    };
    let backfilled = backfill.len();
    ledger.items = merge_history(base, backfill, policy);
    ledger.seeded_from = Some(policy.cutoff().to_string());
    info!(
        backfilled,
        total = ledger.items.len(),
        seeded_from = %policy.cutoff(),
        "history seeded"
    );
}
