//! Fallback placeholders for kinds whose live fetch came back empty.
//!
//! Every stored entry of the kind is re-emitted as unchanged with an
//! explanatory note, so the published snapshot never loses a kind because of
//! a transient upstream outage.

use tracing::warn;

use rw_records::{normalize_name, Record};
use rw_store::StateSnapshot;
use rw_types::{ChangeStatus, RecordKind};

use crate::item::ChangeItem;

/// The note attached to placeholders of `kind`.
pub fn fallback_note(kind: RecordKind) -> String {
    format!("{} API 응답 누락으로 이전 성공 데이터를 표시합니다.", kind.label())
}

/// Re-emit the stored entries of `kind` as unchanged placeholders.
///
/// Statute placeholders are limited to titles that start with one of
/// `law_names` (compared after name normalization). Entries whose payload no
/// longer restores into a record are skipped.
pub fn fallback_items(
    kind: RecordKind,
    state: &StateSnapshot,
    law_names: &[String],
) -> Vec<ChangeItem> {
    let prefixes: Vec<String> = law_names.iter().map(|n| normalize_name(n)).collect();
    let note = fallback_note(kind);

    state
        .section(kind)
        .iter()
        .filter_map(|(key, stored)| match Record::from_payload(kind, key, &stored.payload) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(kind = %kind, key = %key, error = %e, "stored entry unreadable, skipped");
                None
            }
        })
        .filter(|record| !record.title().trim().is_empty())
        .filter(|record| {
            kind != RecordKind::Statute || {
                let title = normalize_name(record.title());
                prefixes.iter().any(|p| title.starts_with(p.as_str()))
            }
        })
        .map(|record| {
            let mut item = ChangeItem::from_record(&record, ChangeStatus::Unchanged);
            item.note = Some(note.clone());
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rw_records::{NoticeRecord, StatuteRecord};
    use rw_store::StateRecord;
    use serde_json::{json, Map};

    fn state() -> StateSnapshot {
        let mut state = StateSnapshot::new();
        for (title, date) in [("대기환경보전법 시행령", "20240101"), ("도로교통법", "20230101")] {
            let record = Record::Statute(StatuteRecord {
                title: title.into(),
                promulgation_date: date.into(),
                promulgation_no: "1".into(),
                ..Default::default()
            });
            state.upsert(
                RecordKind::Statute,
                title,
                StateRecord::new(record.fingerprint(), record.to_payload()),
            );
        }
        let notice = Record::Notice(NoticeRecord {
            title: "대기오염공정시험기준".into(),
            number: "2024-1".into(),
            ..Default::default()
        });
        state.upsert(
            RecordKind::Notice,
            notice.identity_key(),
            StateRecord::new(notice.fingerprint(), notice.to_payload()),
        );
        let mut broken = Map::new();
        broken.insert("title".into(), json!(["not", "a", "string"]));
        state.upsert(RecordKind::Notice, "broken::1", StateRecord::new("x", broken));
        state
    }

    #[test]
    fn statutes_limited_to_configured_names() {
        let items = fallback_items(RecordKind::Statute, &state(), &["대기환경보전법".into()]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "대기환경보전법 시행령");
        assert_eq!(items[0].status, ChangeStatus::Unchanged);
        assert_eq!(items[0].status_ko, "유지");
        assert_eq!(items[0].note.as_deref(), Some(fallback_note(RecordKind::Statute).as_str()));
    }

    #[test]
    fn spacing_differences_still_match() {
        let items = fallback_items(RecordKind::Statute, &state(), &["대기환경 보전법".into()]);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn notices_skip_unreadable_entries() {
        let items = fallback_items(RecordKind::Notice, &state(), &[]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "2024-1");
        assert!(items[0].change_summary.is_none());
    }

    #[test]
    fn empty_section_yields_nothing() {
        assert!(fallback_items(RecordKind::Bill, &state(), &[]).is_empty());
    }
}
