//! Human-readable summaries of what changed between two sightings.

use rw_records::Record;
use rw_store::StateRecord;
use rw_types::ChangeStatus;

/// Summary attached to a first sighting.
pub const NEW_SUMMARY: &str = "신규 감지";
/// Summary when the fingerprint changed but no listed field differs.
pub const NO_FIELD_CHANGE_SUMMARY: &str = "변경 없음";

/// Describe the change from `previous` to `current`.
///
/// Returns `None` for unchanged records. Each differing mutable field is
/// rendered as `label: old -> new`, with `-` standing in for an empty value.
pub fn change_summary(
    status: ChangeStatus,
    previous: Option<&StateRecord>,
    current: &Record,
) -> Option<String> {
    match (status, previous) {
        (ChangeStatus::Unchanged, _) => None,
        (ChangeStatus::New, _) | (_, None) => Some(NEW_SUMMARY.to_string()),
        (ChangeStatus::Modified, Some(prev)) => {
            let old_values = previous_values(prev, current);
            let parts: Vec<String> = current
                .change_fields()
                .into_iter()
                .zip(old_values)
                .filter(|(field, old)| field.value != *old)
                .map(|(field, old)| {
                    format!("{}: {} -> {}", field.label, dash(&old), dash(&field.value))
                })
                .collect();
            if parts.is_empty() {
                Some(NO_FIELD_CHANGE_SUMMARY.to_string())
            } else {
                Some(parts.join("; "))
            }
        }
    }
}

/// Old values of the mutable fields, in `change_fields` order.
///
/// Read from the stored payload; a payload that no longer deserializes falls
/// back to splitting the stored fingerprint, whose parts share that order.
fn previous_values(prev: &StateRecord, current: &Record) -> Vec<String> {
    let key = current.identity_key();
    match Record::from_payload(current.kind(), &key, &prev.payload) {
        Ok(record) => record.change_fields().into_iter().map(|f| f.value).collect(),
        Err(_) => {
            let mut parts: Vec<String> = prev
                .status_key
                .split(rw_records::record::FINGERPRINT_SEPARATOR)
                .map(|p| p.trim().to_string())
                .collect();
            parts.resize(current.change_fields().len(), String::new());
            parts
        }
    }
}

fn dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rw_records::StatuteRecord;
    use serde_json::json;

    fn statute(date: &str, no: &str) -> Record {
        Record::Statute(StatuteRecord {
            title: "Clean Air Act".into(),
            promulgation_date: date.into(),
            promulgation_no: no.into(),
            reform_type: "개정".into(),
            ..Default::default()
        })
    }

    fn stored(record: &Record) -> StateRecord {
        StateRecord::new(record.fingerprint(), record.to_payload())
    }

    #[test]
    fn unchanged_has_no_summary() {
        let r = statute("20210101", "123");
        assert_eq!(change_summary(ChangeStatus::Unchanged, Some(&stored(&r)), &r), None);
    }

    #[test]
    fn new_summary() {
        let r = statute("20210101", "123");
        assert_eq!(change_summary(ChangeStatus::New, None, &r).as_deref(), Some(NEW_SUMMARY));
    }

    #[test]
    fn modified_lists_changed_fields() {
        let old = statute("20210101", "123");
        let new = statute("20220505", "124");
        assert_eq!(
            change_summary(ChangeStatus::Modified, Some(&stored(&old)), &new).as_deref(),
            Some("공포일자: 20210101 -> 20220505; 공포번호: 123 -> 124")
        );
    }

    #[test]
    fn empty_values_render_as_dash() {
        let old = statute("", "123");
        let new = statute("20220505", "");
        assert_eq!(
            change_summary(ChangeStatus::Modified, Some(&stored(&old)), &new).as_deref(),
            Some("공포일자: - -> 20220505; 공포번호: 123 -> -")
        );
    }

    #[test]
    fn fingerprint_only_change_reports_no_field_change() {
        let r = statute("20220505", "124");
        let prev = StateRecord::new("legacy-key", r.to_payload());
        assert_eq!(
            change_summary(ChangeStatus::Modified, Some(&prev), &r).as_deref(),
            Some(NO_FIELD_CHANGE_SUMMARY)
        );
    }

    #[test]
    fn unreadable_payload_falls_back_to_fingerprint() {
        let mut payload = serde_json::Map::new();
        payload.insert("ld".into(), json!(20210101));
        let prev = StateRecord::new("20210101|123|개정", payload);
        assert_eq!(
            change_summary(ChangeStatus::Modified, Some(&prev), &statute("20220505", "123"))
                .as_deref(),
            Some("공포일자: 20210101 -> 20220505")
        );
    }
}
