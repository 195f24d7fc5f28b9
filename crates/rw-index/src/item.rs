use serde::{Deserialize, Serialize};

use rw_records::Record;
use rw_types::{ChangeStatus, RecordKind};

/// A classified record as published in the run artifacts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeItem {
    pub status: ChangeStatus,
    pub status_ko: String,
    #[serde(with = "kind_label")]
    pub kind: RecordKind,
    pub title: String,
    pub date: String,
    pub id: String,
    /// Relative path of the rendered text diff, when one was produced.
    #[serde(default)]
    pub diff_url: Option<String>,
    /// Public detail page.
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_at_utc: Option<String>,
    /// Set on fallback placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ChangeItem {
    /// Build an item for `record` with the given status.
    pub fn from_record(record: &Record, status: ChangeStatus) -> Self {
        Self {
            status,
            status_ko: status.label_ko().to_string(),
            kind: record.kind(),
            title: record.title().to_string(),
            date: record.date().to_string(),
            id: record.ledger_id(),
            diff_url: None,
            link: record.detail_link(),
            change_summary: None,
            detected_at_utc: None,
            note: None,
        }
    }

    /// Key under which duplicate reports of the same item collapse.
    pub fn dedupe_key(&self) -> String {
        format!("{}::{}::{}", self.kind.label(), self.title, self.id)
    }
}

/// Serializes a [`RecordKind`] as its localized label (`법령`, `고시`, `의안`).
/// Deserialization also accepts the English names.
pub mod kind_label {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use rw_types::RecordKind;

    pub fn serialize<S: Serializer>(kind: &RecordKind, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(kind.label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<RecordKind, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rw_records::BillRecord;
    use serde_json::json;

    fn bill_item() -> ChangeItem {
        let record = Record::Bill(BillRecord {
            bill_id: "PRC_A1".into(),
            bill_no: "2100001".into(),
            title: "대기환경보전법 일부개정법률안".into(),
            propose_date: "20240110".into(),
            proc_result: String::new(),
        });
        ChangeItem::from_record(&record, ChangeStatus::New)
    }

    #[test]
    fn serializes_kind_as_label() {
        let value = serde_json::to_value(bill_item()).unwrap();
        assert_eq!(value["kind"], json!("의안"));
        assert_eq!(value["status"], json!("NEW"));
        assert_eq!(value["status_ko"], json!("신규"));
        assert_eq!(value["diff_url"], json!(null));
        assert!(value.get("note").is_none());
    }

    #[test]
    fn deserializes_label_or_name() {
        let mut value = serde_json::to_value(bill_item()).unwrap();
        assert_eq!(serde_json::from_value::<ChangeItem>(value.clone()).unwrap(), bill_item());
        value["kind"] = json!("bill");
        assert_eq!(serde_json::from_value::<ChangeItem>(value).unwrap().kind, RecordKind::Bill);
    }

    #[test]
    fn dedupe_key_joins_kind_title_id() {
        assert_eq!(bill_item().dedupe_key(), "의안::대기환경보전법 일부개정법률안::PRC_A1");
    }
}
