//! Upstream response parsing.
//!
//! Each parser takes an already-decoded JSON body and returns fixed-shape
//! records. The services are inconsistent about single-hit responses (an
//! object instead of a one-element array) and rename fields between
//! revisions, so every field is looked up through a list of known aliases.
//! A body missing its top-level container is reported as
//! [`RecordError::UnexpectedShape`]; the caller decides whether to skip.

use serde_json::Value;
use tracing::debug;

use rw_types::{normalize_date, RecordKind};

use crate::error::{RecordError, RecordResult};
use crate::record::{BillRecord, NoticeRecord, StatuteRecord};

const NOTICE_CONTAINERS: [&str; 3] = ["AdmRulSearch", "AdmrulSearch", "admRulSearch"];

/// Parse a law search body (`{"LawSearch": {"law": [...]}}`).
///
/// `query` stands in for the title when a hit carries none. Hits keep the
/// upstream ranking order.
pub fn parse_statutes(body: &Value, query: &str) -> RecordResult<Vec<StatuteRecord>> {
    let container = body
        .get("LawSearch")
        .ok_or_else(|| shape(RecordKind::Statute, "missing LawSearch container"))?;

    let records = as_list(container.get("law"))
        .into_iter()
        .map(|item| {
            let title = field(item, &["법령명한글"]);
            StatuteRecord {
                title: if title.is_empty() { query.trim().to_string() } else { title },
                promulgation_date: normalize_date(&field(item, &["공포일자"])),
                promulgation_no: field(item, &["공포번호"]),
                reform_type: field(item, &["제개정구분명"]),
                law_id: field(item, &["법령일련번호", "법령ID"]),
                body: ["본문", "body"]
                    .iter()
                    .filter_map(|k| item.get(*k))
                    .find_map(|v| v.as_str())
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_string),
            }
        })
        .collect();
    Ok(records)
}

/// Parse an administrative rule search body.
pub fn parse_notices(body: &Value) -> RecordResult<Vec<NoticeRecord>> {
    let container = NOTICE_CONTAINERS
        .iter()
        .find_map(|name| body.get(*name))
        .ok_or_else(|| shape(RecordKind::Notice, "missing AdmRulSearch container"))?;

    let records = as_list(container.get("admrul"))
        .into_iter()
        .map(|item| NoticeRecord {
            title: field(item, &["행정규칙명"]),
            department: field(item, &["소관부처명"]),
            number: field(item, &["발령번호", "고시번호", "행정규칙ID"]),
            promulgation_date: normalize_date(&field(item, &["발령일자", "공포일자"])),
            enforce_date: normalize_date(&field(item, &["시행일자"])),
            rule_id: field(item, &["행정규칙일련번호", "행정규칙ID"]),
        })
        .collect();
    Ok(records)
}

/// Parse an assembly open-API body.
///
/// The rows live under `{<service>: [{"head": ...}, {"row": [...]}]}`. A bare
/// `{"RESULT": ...}` body is how the service reports "no data" and yields an
/// empty list. Rows without a bill id are dropped.
pub fn parse_bills(body: &Value) -> RecordResult<Vec<BillRecord>> {
    let Some(object) = body.as_object() else {
        return Err(shape(RecordKind::Bill, "body is not an object"));
    };

    let rows = object
        .values()
        .filter_map(Value::as_array)
        .flatten()
        .find_map(|elem| elem.get("row"));

    let rows = match rows {
        Some(rows) => as_list(Some(rows)),
        None if object.contains_key("RESULT") => return Ok(Vec::new()),
        None => return Err(shape(RecordKind::Bill, "no row container")),
    };

    let total = rows.len();
    let records: Vec<BillRecord> = rows
        .into_iter()
        .map(|row| BillRecord {
            bill_id: field(row, &["BILL_ID", "billId"]),
            bill_no: field(row, &["BILL_NO", "BILLNO", "billNo"]),
            title: field(row, &["BILL_NAME", "TITLE", "billName"]),
            propose_date: normalize_date(&field(
                row,
                &["PROPOSE_DT", "RST_PROPOSE_DT", "proposeDt"],
            )),
            proc_result: field(row, &["PROC_RESULT", "PROC_RESULT_CD"]),
        })
        .filter(|r| !r.bill_id.is_empty())
        .collect();
    if records.len() < total {
        debug!(dropped = total - records.len(), "bill rows without id dropped");
    }
    Ok(records)
}

fn shape(kind: RecordKind, reason: &str) -> RecordError {
    RecordError::UnexpectedShape {
        kind,
        reason: reason.to_string(),
    }
}

/// Accept both a list of objects and a single object.
fn as_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().filter(|v| v.is_object()).collect(),
        Some(v) if v.is_object() => vec![v],
        _ => Vec::new(),
    }
}

/// First non-empty scalar among `keys`, as trimmed text.
fn field(item: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| item.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn statutes_from_array() {
        let body = json!({
            "LawSearch": {
                "law": [
                    {"법령명한글": "대기환경보전법", "공포일자": "20240109", "공포번호": 19933,
                     "제개정구분명": "일부개정", "법령일련번호": "257641"},
                    {"법령명한글": "대기환경보전법 시행령", "공포일자": "2023.12.12"}
                ]
            }
        });
        let records = parse_statutes(&body, "대기환경보전법").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].promulgation_no, "19933");
        assert_eq!(records[0].law_id, "257641");
        assert_eq!(records[1].promulgation_date, "20231212");
    }

    #[test]
    fn statute_single_object_and_title_fallback() {
        let body = json!({"LawSearch": {"law": {"공포일자": "20200101"}}});
        let records = parse_statutes(&body, " 대기환경보전법 ").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "대기환경보전법");
    }

    #[test]
    fn statute_body_is_captured() {
        let body = json!({"LawSearch": {"law": {"법령명한글": "A", "본문": "제1조\n제2조"}}});
        let records = parse_statutes(&body, "A").unwrap();
        assert_eq!(records[0].body.as_deref(), Some("제1조\n제2조"));
    }

    #[test]
    fn statute_missing_container_is_shape_error() {
        let err = parse_statutes(&json!({"error": "bad key"}), "A").unwrap_err();
        assert!(matches!(err, RecordError::UnexpectedShape { kind: RecordKind::Statute, .. }));
    }

    #[test]
    fn statute_empty_container_is_empty() {
        let records = parse_statutes(&json!({"LawSearch": {"totalCnt": "0"}}), "A").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn notices_accept_container_aliases() {
        let body = json!({
            "AdmrulSearch": {
                "admrul": {"행정규칙명": "굴뚝 자동측정기기 운영 규정", "소관부처명": "환경부",
                           "고시번호": "2022-10", "발령일자": "2022-01-05", "행정규칙ID": "77"}
            }
        });
        let records = parse_notices(&body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].number, "2022-10");
        assert_eq!(records[0].promulgation_date, "20220105");
        assert_eq!(records[0].rule_id, "77");
    }

    #[test]
    fn bills_from_row_container() {
        let body = json!({
            "TVBPMBILL11": [
                {"head": [{"list_total_count": 2}]},
                {"row": [
                    {"BILL_ID": "PRC_A", "BILL_NO": "2100001", "BILL_NAME": "대기환경보전법 일부개정법률안",
                     "PROPOSE_DT": "2020-06-01", "PROC_RESULT": null},
                    {"BILL_NAME": "id missing"}
                ]}
            ]
        });
        let records = parse_bills(&body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].propose_date, "20200601");
        assert_eq!(records[0].proc_result, "");
    }

    #[test]
    fn bills_no_data_result_is_empty() {
        let body = json!({"RESULT": {"CODE": "INFO-200", "MESSAGE": "해당하는 데이터가 없습니다."}});
        assert!(parse_bills(&body).unwrap().is_empty());
    }

    #[test]
    fn bills_unexpected_shape() {
        assert!(parse_bills(&json!([1, 2])).is_err());
        assert!(parse_bills(&json!({"foo": "bar"})).is_err());
    }
}
