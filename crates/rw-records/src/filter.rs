//! Scoping of parsed records to the monitored subject area.
//!
//! Search endpoints match loosely, so raw hits include notices from unrelated
//! ministries and bills on unrelated statutes. [`RecordFilter`] narrows them
//! down and removes duplicates produced by overlapping queries.

use std::collections::HashSet;

use rw_types::date_sort_value;

use crate::record::{BillRecord, NoticeRecord};

/// Department and keyword rules applied after parsing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Notices whose department contains none of these are dropped. A notice
    /// with no department is kept.
    pub notice_departments: Vec<String>,
    /// A bill whose title mentions one of these statutes is always kept.
    pub bill_law_keywords: Vec<String>,
    /// Topic keywords accepted when `strict_bill_keywords` is on.
    pub bill_topic_keywords: Vec<String>,
    /// When off, only `bill_law_keywords` qualify a bill.
    pub strict_bill_keywords: bool,
}

impl RecordFilter {
    /// Returns `true` if the notice belongs to a monitored department.
    pub fn accepts_notice(&self, notice: &NoticeRecord) -> bool {
        let dept = notice.department.trim();
        dept.is_empty()
            || self.notice_departments.is_empty()
            || self.notice_departments.iter().any(|d| dept.contains(d.as_str()))
    }

    /// Returns `true` if the bill title is in scope.
    pub fn accepts_bill_title(&self, title: &str) -> bool {
        let t = title.trim();
        if t.is_empty() {
            return false;
        }
        if self.bill_law_keywords.iter().any(|k| t.contains(k.as_str())) {
            return true;
        }
        self.strict_bill_keywords
            && self.bill_topic_keywords.iter().any(|k| t.contains(k.as_str()))
    }

    /// Filter notices by department and drop repeats of `title::number`,
    /// keeping the first occurrence.
    pub fn select_notices(&self, notices: Vec<NoticeRecord>) -> Vec<NoticeRecord> {
        let mut seen = HashSet::new();
        notices
            .into_iter()
            .filter(|n| self.accepts_notice(n))
            .filter(|n| seen.insert(format!("{}::{}", n.title, n.number)))
            .collect()
    }

    /// Filter bills by title, drop repeated bill ids, order by proposal date
    /// (newest first) and keep at most `limit`.
    pub fn select_bills(&self, bills: Vec<BillRecord>, limit: usize) -> Vec<BillRecord> {
        let mut seen = HashSet::new();
        let mut out: Vec<BillRecord> = bills
            .into_iter()
            .filter(|b| self.accepts_bill_title(&b.title))
            .filter(|b| seen.insert(b.bill_id.clone()))
            .collect();
        // Stable sort keeps upstream order among bills proposed the same day.
        out.sort_by(|a, b| date_sort_value(&b.propose_date).cmp(&date_sort_value(&a.propose_date)));
        out.truncate(limit);
        out
    }
}

/// Collapse spacing and middle-dot variants so that law names written by
/// different systems compare equal.
pub fn normalize_name(text: &str) -> String {
    text.chars()
        .filter(|c| *c != ' ' && *c != '\t')
        .map(|c| if c == 'ㆍ' { '·' } else { c })
        .collect()
}
