//! Typed regulatory records and the keys derived from them.
//!
//! Field names in the serialized form match the payload layout of the
//! persisted state file, so a record can be restored from the last stored
//! payload when a live fetch comes back empty.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use rw_types::RecordKind;

use crate::error::{RecordError, RecordResult};

/// Separator between the mutable fields of a fingerprint.
pub const FINGERPRINT_SEPARATOR: &str = "|";

const LAW_INFO_URL: &str = "https://www.law.go.kr/LSW/lsInfoP.do";
const ADMRUL_INFO_URL: &str = "https://www.law.go.kr/LSW/admRulLsInfoP.do";
const LAW_SEARCH_URL: &str = "https://www.law.go.kr/LSW/lsSc.do";
const BILL_DETAIL_URL: &str = "https://likms.assembly.go.kr/bill/billDetail.do";

/// A statute, enforcement decree, or enforcement rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatuteRecord {
    #[serde(rename = "law_name", alias = "name", default)]
    pub title: String,
    #[serde(rename = "ld", default)]
    pub promulgation_date: String,
    #[serde(rename = "ln", default)]
    pub promulgation_no: String,
    #[serde(default)]
    pub reform_type: String,
    #[serde(default)]
    pub law_id: String,
    /// Rendered article text, when the source supplied it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// An administrative rule or notice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeRecord {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "dept", default)]
    pub department: String,
    #[serde(rename = "num", default)]
    pub number: String,
    #[serde(default)]
    pub promulgation_date: String,
    #[serde(default)]
    pub enforce_date: String,
    #[serde(rename = "admrul_id", default)]
    pub rule_id: String,
}

/// A national assembly bill.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRecord {
    #[serde(default)]
    pub bill_id: String,
    #[serde(default)]
    pub bill_no: String,
    #[serde(rename = "bill_name", default)]
    pub title: String,
    #[serde(rename = "propose_dt", default)]
    pub propose_date: String,
    #[serde(default)]
    pub proc_result: String,
}

/// One mutable field participating in a fingerprint, for change summaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeField {
    /// Localized field label.
    pub label: &'static str,
    /// Current value.
    pub value: String,
}

impl ChangeField {
    fn new(label: &'static str, value: &str) -> Self {
        Self {
            label,
            value: value.trim().to_string(),
        }
    }
}

/// A normalized record of any kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    Statute(StatuteRecord),
    Notice(NoticeRecord),
    Bill(BillRecord),
}

impl Record {
    /// The record's kind.
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Statute(_) => RecordKind::Statute,
            Record::Notice(_) => RecordKind::Notice,
            Record::Bill(_) => RecordKind::Bill,
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &str {
        match self {
            Record::Statute(r) => &r.title,
            Record::Notice(r) => &r.title,
            Record::Bill(r) => &r.title,
        }
    }

    /// The reference date (normalized), used for display and history keys.
    pub fn date(&self) -> &str {
        match self {
            Record::Statute(r) => &r.promulgation_date,
            Record::Notice(r) if !r.promulgation_date.is_empty() => &r.promulgation_date,
            Record::Notice(r) => &r.enforce_date,
            Record::Bill(r) => &r.propose_date,
        }
    }

    /// Key used to look up prior state across runs.
    pub fn identity_key(&self) -> String {
        match self {
            Record::Statute(r) => r.title.clone(),
            Record::Notice(r) => format!("{}::{}", r.title, r.number),
            Record::Bill(r) => r.bill_id.clone(),
        }
    }

    /// The mutable fields whose change makes a record MODIFIED.
    pub fn change_fields(&self) -> Vec<ChangeField> {
        match self {
            Record::Statute(r) => vec![
                ChangeField::new("공포일자", &r.promulgation_date),
                ChangeField::new("공포번호", &r.promulgation_no),
                ChangeField::new("제개정구분", &r.reform_type),
            ],
            Record::Notice(r) => vec![
                ChangeField::new("발령일자", &r.promulgation_date),
                ChangeField::new("시행일자", &r.enforce_date),
                ChangeField::new("발령번호", &r.number),
            ],
            Record::Bill(r) => vec![
                ChangeField::new("의안번호", &r.bill_no),
                ChangeField::new("처리결과", &r.proc_result),
                ChangeField::new("제안일", &r.propose_date),
            ],
        }
    }

    /// The fingerprint (`status_key`): mutable fields joined with `|`.
    pub fn fingerprint(&self) -> String {
        let parts: Vec<&str> = match self {
            Record::Statute(r) => vec![&r.promulgation_date, &r.promulgation_no, &r.reform_type],
            Record::Notice(r) => vec![&r.promulgation_date, &r.enforce_date, &r.number],
            Record::Bill(r) => vec![&r.bill_no, &r.proc_result, &r.propose_date],
        };
        parts.join(FINGERPRINT_SEPARATOR)
    }

    /// Identifier recorded in change entries and ledger rows.
    ///
    /// Statutes and notices have no single stable upstream id across
    /// revisions, so the revision-identifying fields are joined instead.
    pub fn ledger_id(&self) -> String {
        let joined = match self {
            Record::Statute(r) => {
                [r.promulgation_no.as_str(), &r.promulgation_date, &r.reform_type].join("|")
            }
            Record::Notice(r) => {
                [r.number.as_str(), &r.promulgation_date, &r.enforce_date].join("|")
            }
            Record::Bill(r) => return r.bill_id.clone(),
        };
        let trimmed = joined.trim_matches('|');
        if trimmed.is_empty() {
            self.identity_key()
        } else {
            trimmed.to_string()
        }
    }

    /// Public detail page for the record.
    pub fn detail_link(&self) -> String {
        match self {
            Record::Statute(r) if !r.law_id.trim().is_empty() => format!(
                "{LAW_INFO_URL}?lsiSeq={}&efYd={}",
                r.law_id.trim(),
                r.promulgation_date
            ),
            Record::Notice(r) if !r.rule_id.trim().is_empty() => {
                format!("{ADMRUL_INFO_URL}?admRulSeq={}", r.rule_id.trim())
            }
            Record::Bill(r) => format!("{BILL_DETAIL_URL}?billId={}", r.bill_id),
            other => format!(
                "{LAW_SEARCH_URL}?menuId=1&query={}",
                other.title().replace(' ', "%20")
            ),
        }
    }

    /// Text body available for line diffing (statutes only).
    pub fn body(&self) -> Option<&str> {
        match self {
            Record::Statute(r) => r.body.as_deref(),
            _ => None,
        }
    }

    /// Serialize into the payload map stored alongside the fingerprint.
    pub fn to_payload(&self) -> Map<String, Value> {
        let value = match self {
            Record::Statute(r) => serde_json::to_value(r),
            Record::Notice(r) => serde_json::to_value(r),
            Record::Bill(r) => serde_json::to_value(r),
        };
        match value {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Restore a record from a stored payload.
    ///
    /// `key` is the identity key the payload was stored under; it fills in
    /// the title (statutes) or bill id when the payload predates those fields.
    pub fn from_payload(
        kind: RecordKind,
        key: &str,
        payload: &Map<String, Value>,
    ) -> RecordResult<Self> {
        let value = Value::Object(payload.clone());
        let wrap = |source| RecordError::Payload { kind, source };
        let record = match kind {
            RecordKind::Statute => {
                let mut r: StatuteRecord = serde_json::from_value(value).map_err(wrap)?;
                if r.title.trim().is_empty() {
                    r.title = key.to_string();
                }
                Record::Statute(r)
            }
            RecordKind::Notice => Record::Notice(serde_json::from_value(value).map_err(wrap)?),
            RecordKind::Bill => {
                let mut r: BillRecord = serde_json::from_value(value).map_err(wrap)?;
                if r.bill_id.trim().is_empty() {
                    r.bill_id = key.to_string();
                }
                Record::Bill(r)
            }
        };
        Ok(record)
    }
}
