//! NEW / MOD / OK classification against the state snapshot.

use tracing::debug;

use rw_diff::DiffArtifact;
use rw_records::Record;
use rw_store::{StateRecord, StateSnapshot};
use rw_types::{ChangeStatus, RunTimestamp};

use crate::item::ChangeItem;
use crate::summary::change_summary;

/// Status of a record whose current fingerprint is `fingerprint`.
pub fn status_for(previous: Option<&StateRecord>, fingerprint: &str) -> ChangeStatus {
    match previous {
        None => ChangeStatus::New,
        Some(prev) if prev.status_key != fingerprint => ChangeStatus::Modified,
        Some(_) => ChangeStatus::Unchanged,
    }
}

/// Classify `record` and overwrite its state entry with the current
/// fingerprint and payload, whatever the outcome.
///
/// Returns the status and the entry that was replaced.
pub fn classify(
    record: &Record,
    state: &mut StateSnapshot,
    seen_at: &str,
) -> (ChangeStatus, Option<StateRecord>) {
    let key = record.identity_key();
    let fingerprint = record.fingerprint();
    let status = status_for(state.get(record.kind(), &key), &fingerprint);
    let current = StateRecord::new(fingerprint, record.to_payload()).seen_at(seen_at);
    let previous = state.upsert(record.kind(), key, current);
    (status, previous)
}

/// Outcome of observing one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Detection {
    pub item: ChangeItem,
    /// Text diff to publish before the item is committed to the ledger.
    pub diff: Option<DiffArtifact>,
}

/// Classifier for one run, bound to the run's state snapshot.
pub struct Classifier<'a> {
    state: &'a mut StateSnapshot,
    detected_at: String,
    text_diff: bool,
}

impl<'a> Classifier<'a> {
    /// Create a classifier stamping detections with `run`.
    pub fn new(state: &'a mut StateSnapshot, run: &RunTimestamp) -> Self {
        Self {
            state,
            detected_at: run.utc_iso(),
            text_diff: false,
        }
    }

    /// Enable rendering of line diffs for modified statutes with bodies.
    pub fn with_text_diff(mut self, enabled: bool) -> Self {
        self.text_diff = enabled;
        self
    }

    /// Read-only view of the state as updated so far.
    pub fn state(&self) -> &StateSnapshot {
        self.state
    }

    /// Classify one record, update the state, and build its change item.
    pub fn observe(&mut self, record: &Record) -> Detection {
        let (status, previous) = classify(record, self.state, &self.detected_at);

        let mut item = ChangeItem::from_record(record, status);
        item.detected_at_utc = Some(self.detected_at.clone());
        item.change_summary = change_summary(status, previous.as_ref(), record);

        let diff = if status == ChangeStatus::Modified && self.text_diff {
            previous
                .as_ref()
                .and_then(|prev| render_diff(prev, record))
        } else {
            None
        };
        item.diff_url = diff.as_ref().map(DiffArtifact::relative_path);

        debug!(
            kind = %record.kind(),
            key = %record.identity_key(),
            status = %status,
            diff = diff.is_some(),
            "record classified"
        );
        Detection { item, diff }
    }
}

fn render_diff(prev: &StateRecord, record: &Record) -> Option<DiffArtifact> {
    let old_body = prev.text("body")?;
    let new_body = record.body().filter(|b| !b.trim().is_empty())?;
    let old_label = prev.text("ld").unwrap_or("이전");
    let new_label = if record.date().is_empty() {
        "현재"
    } else {
        record.date()
    };
    Some(DiffArtifact::render(
        &record.identity_key(),
        record.date(),
        old_label,
        new_label,
        old_body,
        new_body,
    ))
}
