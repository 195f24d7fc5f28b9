//! The history merge routine.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::debug;

use rw_types::{date_sort_value, iso_sort_value, normalize_date, yyyymmdd_from_iso};

use crate::entry::HistoryEntry;
use crate::error::{LedgerError, LedgerResult};

/// Parameters of a merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergePolicy {
    cutoff: String,
    fallback_detected_at: String,
}

impl MergePolicy {
    /// Build a policy. `cutoff` must normalize to a full `YYYYMMDD` date.
    pub fn new(cutoff: &str, fallback_detected_at: impl Into<String>) -> LedgerResult<Self> {
        let normalized = normalize_date(cutoff);
        if normalized.len() != 8 {
            return Err(LedgerError::InvalidCutoff(cutoff.to_string()));
        }
        Ok(Self {
            cutoff: normalized,
            fallback_detected_at: fallback_detected_at.into(),
        })
    }

    /// The cutoff as `YYYYMMDD`.
    pub fn cutoff(&self) -> &str {
        &self.cutoff
    }

    /// Detection timestamp given to rows that carry neither a timestamp nor
    /// a complete date.
    pub fn fallback_detected_at(&self) -> &str {
        &self.fallback_detected_at
    }

    /// Returns `true` if a normalized entry is dated before the cutoff.
    ///
    /// The entry date is the comparator; an undated entry is judged by the
    /// date part of its detection timestamp, and an entry with neither is
    /// kept.
    pub fn is_before_cutoff(&self, entry: &HistoryEntry) -> bool {
        let mut date = date_sort_value(&entry.date);
        if date == 0 {
            date = date_sort_value(&yyyymmdd_from_iso(&entry.detected_at_utc));
        }
        date != 0 && date < date_sort_value(&self.cutoff)
    }
}

/// Merge `incoming` rows into `existing` rows.
///
/// Every row is normalized, rows before the cutoff are dropped, rows sharing
/// a history key collapse to the one detected last, and the result is
/// ordered newest detection first. The output depends only on the multiset
/// of inputs, not on their order.
pub fn merge_history(
    existing: Vec<HistoryEntry>,
    incoming: Vec<HistoryEntry>,
    policy: &MergePolicy,
) -> Vec<HistoryEntry> {
    let total = existing.len() + incoming.len();
    let mut merged: BTreeMap<String, Candidate> = BTreeMap::new();
    let mut dropped = 0usize;

    for mut entry in existing.into_iter().chain(incoming) {
        entry.normalize(&policy.fallback_detected_at);
        if policy.is_before_cutoff(&entry) {
            dropped += 1;
            continue;
        }
        let candidate = Candidate::new(entry);
        match merged.get(&candidate.entry.history_key) {
            Some(current) if current.precedence(&candidate) != Ordering::Less => {}
            _ => {
                merged.insert(candidate.entry.history_key.clone(), candidate);
            }
        }
    }

    let mut out: Vec<Candidate> = merged.into_values().collect();
    out.sort_by(Candidate::display_order);

    debug!(
        input = total,
        dropped_before_cutoff = dropped,
        output = out.len(),
        cutoff = %policy.cutoff,
        "history merged"
    );
    out.into_iter().map(|c| c.entry).collect()
}

/// A normalized row with its precomputed ordering keys.
struct Candidate {
    detected: i64,
    date: u32,
    canonical: String,
    entry: HistoryEntry,
}

impl Candidate {
    fn new(entry: HistoryEntry) -> Self {
        Self {
            detected: iso_sort_value(&entry.detected_at_utc),
            date: date_sort_value(&entry.date),
            canonical: serde_json::to_string(&entry).unwrap_or_default(),
            entry,
        }
    }

    /// Which of two rows with the same history key survives: later parsed
    /// timestamp, then greater timestamp text, then greater serialization.
    fn precedence(&self, other: &Self) -> Ordering {
        self.detected
            .cmp(&other.detected)
            .then_with(|| self.entry.detected_at_utc.cmp(&other.entry.detected_at_utc))
            .then_with(|| self.canonical.cmp(&other.canonical))
    }

    fn display_order(a: &Self, b: &Self) -> Ordering {
        b.detected
            .cmp(&a.detected)
            .then_with(|| b.date.cmp(&a.date))
            .then_with(|| a.entry.kind.cmp(&b.entry.kind))
            .then_with(|| a.entry.title.cmp(&b.entry.title))
            .then_with(|| a.entry.history_key.cmp(&b.entry.history_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntrySource;
    use proptest::prelude::*;

    const FALLBACK: &str = "2024-06-01T00:00:00.000Z";

    fn policy() -> MergePolicy {
        MergePolicy::new("20210101", FALLBACK).unwrap()
    }

    fn entry(kind: &str, id: &str, date: &str, title: &str, ts: &str) -> HistoryEntry {
        HistoryEntry {
            status: "MOD".into(),
            kind: kind.into(),
            id: id.into(),
            date: date.into(),
            title: title.into(),
            detected_at_utc: ts.into(),
            source: Some(EntrySource::Delta),
            ..Default::default()
        }
    }

    #[test]
    fn rejects_partial_cutoff() {
        assert!(matches!(
            MergePolicy::new("2021", FALLBACK),
            Err(LedgerError::InvalidCutoff(_))
        ));
        assert_eq!(MergePolicy::new("2021-01-01", FALLBACK).unwrap().cutoff(), "20210101");
    }

    #[test]
    fn later_detection_wins() {
        let t1 = entry("법령", "123", "20220505", "Clean Air Act", "2022-05-06T00:00:00Z");
        let mut t2 = entry("법령", "123", "20220505", "Clean Air Act", "2022-05-07T00:00:00Z");
        t2.change_summary = "second".into();

        let out = merge_history(vec![t2.clone()], vec![t1.clone()], &policy());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].history_key, "법령||123||20220505||Clean Air Act");
        assert_eq!(out[0].change_summary, "second");

        let out = merge_history(vec![t1], vec![t2], &policy());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].change_summary, "second");
    }

    #[test]
    fn backfill_cutoff_boundary() {
        let before = entry("법령", "1", "20201231", "a", "");
        let on = entry("법령", "2", "20210101", "b", "");
        let out = merge_history(Vec::new(), vec![before, on], &policy());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, "20210101");
        assert_eq!(out[0].detected_at_utc, "2021-01-01T00:00:00Z");
    }

    #[test]
    fn undated_rows_judged_by_timestamp() {
        let old = entry("의안", "1", "", "a", "2019-03-01T00:00:00Z");
        let recent = entry("의안", "2", "", "b", "2022-03-01T00:00:00Z");
        let legacy = entry("의안", "3", "", "c", "unknown");
        let out = merge_history(vec![old, recent, legacy], Vec::new(), &policy());
        let ids: Vec<&str> = out.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn ordering_rules() {
        let ts = "2024-01-01T00:00:00Z";
        let out = merge_history(
            vec![
                entry("의안", "1", "20230101", "z", ts),
                entry("고시", "2", "20230101", "y", ts),
                entry("법령", "3", "20220101", "x", ts),
                entry("법령", "4", "20230101", "b", ts),
                entry("법령", "5", "20230101", "a", "2024-02-01T00:00:00Z"),
            ],
            Vec::new(),
            &policy(),
        );
        let ids: Vec<&str> = out.iter().map(|e| e.id.as_str()).collect();
        // Newest detection, then newest date, then kind label, then title.
        assert_eq!(ids, vec!["5", "2", "4", "1", "3"]);
    }

    #[test]
    fn malformed_timestamp_loses_to_valid_one() {
        let bad = entry("법령", "1", "20220101", "a", "not-a-time");
        let good = entry("법령", "1", "20220101", "a", "2022-01-02T00:00:00Z");
        let out = merge_history(vec![good.clone()], vec![bad], &policy());
        assert_eq!(out[0].detected_at_utc, good.detected_at_utc);
    }

    fn arb_entry() -> impl Strategy<Value = HistoryEntry> {
        (
            prop::sample::select(vec!["법령", "고시", "의안"]),
            "[0-9]{1}",
            prop::sample::select(vec!["", "20201231", "20210101", "20220505", "2023"]),
            "[ab]{1}",
            prop::sample::select(vec![
                "",
                "2022-05-05T00:00:00Z",
                "2022-05-06T09:00:00+09:00",
                "2023-01-01T00:00:00.000Z",
                "garbage",
            ]),
            "[xy]{0,1}",
        )
            .prop_map(|(kind, id, date, title, ts, summary)| {
                let mut e = entry(kind, &id, date, &title, ts);
                e.change_summary = summary;
                e
            })
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(
            existing in prop::collection::vec(arb_entry(), 0..12),
            delta in prop::collection::vec(arb_entry(), 0..12),
        ) {
            let once = merge_history(existing.clone(), delta, &policy());
            let twice = merge_history(existing, once.clone(), &policy());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn keys_are_unique(entries in prop::collection::vec(arb_entry(), 0..24)) {
            let out = merge_history(entries, Vec::new(), &policy());
            let mut keys: Vec<&str> = out.iter().map(|e| e.history_key.as_str()).collect();
            let before = keys.len();
            keys.sort_unstable();
            keys.dedup();
            prop_assert_eq!(keys.len(), before);
        }

        #[test]
        fn order_independent(
            existing in prop::collection::vec(arb_entry(), 0..12),
            delta in prop::collection::vec(arb_entry(), 0..12),
        ) {
            let forward = merge_history(existing.clone(), delta.clone(), &policy());
            let mut all: Vec<HistoryEntry> = delta.into_iter().chain(existing).collect();
            all.reverse();
            let reversed = merge_history(Vec::new(), all, &policy());
            prop_assert_eq!(forward, reversed);
        }

        #[test]
        fn nothing_before_cutoff_survives(entries in prop::collection::vec(arb_entry(), 0..24)) {
            let p = policy();
            for e in merge_history(entries, Vec::new(), &p) {
                prop_assert!(!p.is_before_cutoff(&e));
            }
        }
    }
}
