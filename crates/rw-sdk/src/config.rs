//! Run configuration.
//!
//! Every field has a built-in default, so an empty TOML file (or none at all)
//! yields the standard monitoring scope. Credentials are kept out of the file
//! and supplied separately through [`Credentials`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rw_records::RecordFilter;
use rw_types::{normalize_date, RecordKind};

use crate::error::{SdkError, SdkResult};

/// Configuration of one notifier run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Record kinds to process, in processing order.
    pub kinds: Vec<RecordKind>,
    /// Earliest date (`YYYYMMDD`) the ledger keeps.
    pub history_start: String,
    /// Statutes to watch; also the prefixes allowed in statute fallback.
    pub law_names: Vec<String>,
    /// Search terms for administrative notices.
    pub notice_queries: Vec<String>,
    /// Departments whose notices are in scope.
    pub notice_departments: Vec<String>,
    /// Statute names that qualify a bill.
    pub bill_law_keywords: Vec<String>,
    /// Topic keywords that qualify a bill when the strict filter is on.
    pub bill_strict_keywords: Vec<String>,
    /// Additional topic keywords.
    pub bill_extra_keywords: Vec<String>,
    /// Assembly terms searched during backfill.
    pub bill_history_ages: Vec<u32>,
    /// Assembly term for live bill searches; derived from the run date when unset.
    pub assembly_age: Option<u32>,
    /// Maximum number of bills per run.
    pub bill_limit: usize,
    /// Law service base URLs in order of preference.
    pub law_endpoints: Vec<String>,
    /// Assembly bill search service.
    pub bill_search_service: String,
    /// Assembly services listing recently processed bills.
    pub bill_recent_services: Vec<String>,
    pub features: FeatureFlags,
    pub paths: PathsConfig,
}

/// Optional behaviors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Render line diffs for modified statutes that carry a text body.
    pub enable_text_diff: bool,
    /// Accept bills on topic keywords, not only on statute names.
    pub bill_strict_filter: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_text_diff: true,
            bill_strict_filter: true,
        }
    }
}

/// File locations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub state: PathBuf,
    pub history: PathBuf,
    /// Older change-log export read when `history` does not exist yet.
    pub legacy_changelog: PathBuf,
    /// Directory receiving published artifacts.
    pub out_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state: PathBuf::from("data/state.json"),
            history: PathBuf::from("data/history.json"),
            legacy_changelog: PathBuf::from("public/changelog.json"),
            out_dir: PathBuf::from("public"),
        }
    }
}

impl PathsConfig {
    /// Resolve every relative path against `root`.
    pub fn rooted_at(&self, root: &Path) -> Self {
        Self {
            state: root.join(&self.state),
            history: root.join(&self.history),
            legacy_changelog: root.join(&self.legacy_changelog),
            out_dir: root.join(&self.out_dir),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            kinds: RecordKind::ALL.to_vec(),
            history_start: "20210101".into(),
            law_names: strings(&[
                "대기환경보전법",
                "대기환경보전법 시행령",
                "대기환경보전법 시행규칙",
                "환경분야 시험·검사 등에 관한 법률",
                "환경분야 시험 검사 등에 관한 법률",
                "환경분야 시험·검사 등에 관한 법률 시행령",
                "환경분야 시험·검사 등에 관한 법률 시행규칙",
                "대기관리권역의 대기환경개선에 관한 특별법",
                "대기관리권역의 대기환경개선에 관한 특별법 시행령",
                "대기관리권역의 대기환경개선에 관한 특별법 시행규칙",
                "환경오염시설의 통합관리에 관한 법률",
                "환경오염시설의 통합관리에 관한 법률 시행령",
                "환경오염시설의 통합관리에 관한 법률 시행규칙",
            ]),
            notice_queries: strings(&[
                "환경시험·검사기관 정도관리 운영등에 관한 규정",
                "환경시험 검사기관 정도관리 운영",
                "대기오염공정시험기준",
                "대기배출시설",
                "대기오염물질",
                "방지시설",
                "배출가스",
                "자가측정",
                "기본부과금",
                "초과부과금",
                "통합허가",
                "통합관리",
                "굴뚝",
                "미세먼지",
                "오존",
            ]),
            notice_departments: strings(&["환경부", "국립환경과학원", "기후에너지환경부"]),
            bill_law_keywords: strings(&[
                "대기환경보전법",
                "환경분야 시험·검사 등에 관한 법률",
                "대기관리권역의 대기환경개선에 관한 특별법",
                "환경오염시설의 통합관리에 관한 법률",
            ]),
            bill_strict_keywords: strings(&[
                "대기환경",
                "대기오염",
                "대기관리권역",
                "배출시설",
                "방지시설",
                "배출가스",
                "자가측정",
                "굴뚝",
                "미세먼지",
                "오염물질",
                "환경오염시설",
                "공정시험기준",
                "환경시험",
                "시험·검사",
            ]),
            bill_extra_keywords: Vec::new(),
            bill_history_ages: vec![21, 22],
            assembly_age: None,
            bill_limit: 120,
            law_endpoints: strings(&[
                "https://www.law.go.kr/DRF",
                "https://law-proxy.jinsu133.workers.dev/DRF",
            ]),
            bill_search_service: "TVBPMBILL11".into(),
            bill_recent_services: strings(&[
                "nzmimeepazxkubdpn",
                "nxjuyqnxadtotdrbw",
                "nxtkyptyaolzcbfwl",
                "nwbpacrgavhjryiph",
            ]),
            features: FeatureFlags::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl RunConfig {
    /// Parse a TOML document; absent keys take their defaults.
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| SdkError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject configurations a run cannot proceed with.
    pub fn validate(&self) -> SdkResult<()> {
        if normalize_date(&self.history_start).len() != 8 {
            return Err(SdkError::InvalidConfig(format!(
                "history_start {:?} is not a YYYYMMDD date",
                self.history_start
            )));
        }
        if self.kinds.is_empty() {
            return Err(SdkError::InvalidConfig("no record kinds selected".into()));
        }
        let needs_law_service = self
            .kinds
            .iter()
            .any(|k| matches!(k, RecordKind::Statute | RecordKind::Notice));
        if needs_law_service && self.law_endpoints().is_empty() {
            return Err(SdkError::InvalidConfig("no law_endpoints configured".into()));
        }
        if self.kinds.contains(&RecordKind::Bill) {
            if self.bill_limit == 0 {
                return Err(SdkError::InvalidConfig("bill_limit must be positive".into()));
            }
            if self.bill_search_service.trim().is_empty() {
                return Err(SdkError::InvalidConfig("bill_search_service is empty".into()));
            }
        }
        Ok(())
    }

    /// The history cutoff as `YYYYMMDD`.
    pub fn cutoff(&self) -> String {
        normalize_date(&self.history_start)
    }

    /// Law endpoints with blanks and duplicates removed and trailing `/`
    /// stripped, preference order kept.
    pub fn law_endpoints(&self) -> Vec<String> {
        unique_keep_order(&self.law_endpoints)
    }

    /// Department and keyword rules for parsed records.
    pub fn record_filter(&self) -> RecordFilter {
        RecordFilter {
            notice_departments: self.notice_departments.clone(),
            bill_law_keywords: self.bill_law_keywords.clone(),
            bill_topic_keywords: self
                .bill_strict_keywords
                .iter()
                .chain(&self.bill_extra_keywords)
                .cloned()
                .collect(),
            strict_bill_keywords: self.features.bill_strict_filter,
        }
    }
}

/// Trim, drop blanks and duplicates, strip trailing `/`, keep first-seen order.
pub fn unique_keep_order(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let v = value.trim().trim_end_matches('/');
        if !v.is_empty() && !out.iter().any(|o| o == v) {
            out.push(v.to_string());
        }
    }
    out
}

/// Upstream service keys.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    law_oc: String,
    assembly_key: String,
}

impl Credentials {
    pub fn new(law_oc: impl Into<String>, assembly_key: impl Into<String>) -> Self {
        Self {
            law_oc: law_oc.into().trim().to_string(),
            assembly_key: assembly_key.into().trim().to_string(),
        }
    }

    pub fn law_oc(&self) -> &str {
        &self.law_oc
    }

    pub fn assembly_key(&self) -> &str {
        &self.assembly_key
    }

    /// Check that every key needed for `kinds` is present.
    pub fn validate(&self, kinds: &[RecordKind]) -> SdkResult<()> {
        let needs_law = kinds
            .iter()
            .any(|k| matches!(k, RecordKind::Statute | RecordKind::Notice));
        if needs_law && self.law_oc.is_empty() {
            return Err(SdkError::MissingCredential("LAW_OC"));
        }
        if kinds.contains(&RecordKind::Bill) && self.assembly_key.is_empty() {
            return Err(SdkError::MissingCredential("ASSEMBLY_KEY"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("law_oc", &redact(&self.law_oc))
            .field("assembly_key", &redact(&self.assembly_key))
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
