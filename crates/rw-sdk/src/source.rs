//! The fetch boundary.
//!
//! The notifier never talks HTTP itself. It asks a [`RecordSource`] for the
//! decoded JSON body of one upstream query and gets back an explicit outcome:
//! a body, a skip with a reason (logged, the run continues), or a fatal error
//! (the run aborts before persisting anything).
//!
//! Each request names the [`Service`] it is addressed to. The [`Upstream`]
//! passed alongside carries the law endpoints in preference order and the
//! service keys, so a networked source has everything it needs to build the
//! actual call.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rw_types::RecordKind;

use crate::config::{Credentials, RunConfig};
use crate::error::{SdkError, SdkResult};

/// Upstream service a request is addressed to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Service {
    /// Law search on the law service (`target=law`).
    LawSearch,
    /// Administrative rule search on the law service (`target=admrul`).
    AdmRulSearch,
    /// Assembly bill search by name; carries the service code.
    BillSearch(String),
    /// Assembly listing of recently processed bills; carries the service code.
    BillListing(String),
}

impl Service {
    /// Target name on the law service, or the assembly service code.
    pub fn code(&self) -> &str {
        match self {
            Service::LawSearch => "law",
            Service::AdmRulSearch => "admrul",
            Service::BillSearch(code) | Service::BillListing(code) => code,
        }
    }

    /// The record kind the service returns.
    pub fn kind(&self) -> RecordKind {
        match self {
            Service::LawSearch => RecordKind::Statute,
            Service::AdmRulSearch => RecordKind::Notice,
            Service::BillSearch(_) | Service::BillListing(_) => RecordKind::Bill,
        }
    }

    /// Returns `true` for services hosted on the law endpoints.
    pub fn is_law_service(&self) -> bool {
        matches!(self, Service::LawSearch | Service::AdmRulSearch)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One upstream query.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub kind: RecordKind,
    pub service: Service,
    /// Search term; empty for listing services.
    pub query: String,
    /// Part of the historical backfill rather than the live pass.
    pub backfill: bool,
    /// Assembly term, for bill services.
    pub age: Option<u32>,
}

impl FetchRequest {
    /// A live query.
    pub fn live(service: Service, query: impl Into<String>) -> Self {
        Self {
            kind: service.kind(),
            service,
            query: query.into(),
            backfill: false,
            age: None,
        }
    }

    /// A backfill query.
    pub fn backfill(service: Service, query: impl Into<String>) -> Self {
        Self {
            backfill: true,
            ..Self::live(service, query)
        }
    }

    /// Restrict a bill query to an assembly term.
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }
}

/// Connection settings shared by every request of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upstream {
    /// Law service base URLs, most preferred first.
    pub law_endpoints: Vec<String>,
    pub credentials: Credentials,
}

impl Upstream {
    pub fn new(config: &RunConfig, credentials: &Credentials) -> Self {
        Self {
            law_endpoints: config.law_endpoints(),
            credentials: credentials.clone(),
        }
    }

    /// The key requests to `service` authenticate with.
    pub fn key_for(&self, service: &Service) -> &str {
        if service.is_law_service() {
            self.credentials.law_oc()
        } else {
            self.credentials.assembly_key()
        }
    }

    /// Base URLs to try for `service`, in order. Empty for assembly services,
    /// which have a single fixed host.
    pub fn endpoints_for(&self, service: &Service) -> &[String] {
        if service.is_law_service() {
            &self.law_endpoints
        } else {
            &[]
        }
    }
}

/// Result of one query.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    /// Decoded response body.
    Fetched(Value),
    /// Nothing usable; the query is skipped.
    Skipped { reason: String },
    /// Unrecoverable; the run must stop.
    Fatal(String),
}

/// Supplier of upstream response bodies.
pub trait RecordSource {
    fn fetch(&self, upstream: &Upstream, request: &FetchRequest) -> FetchOutcome;
}

/// A recorded upstream response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapturedResponse {
    pub kind: RecordKind,
    /// Service code; matches any service of the kind when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub backfill: bool,
    /// Matches any term when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Replayed as a skip with this reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Replay `error` as fatal instead of a skip.
    #[serde(default)]
    pub fatal: bool,
}

impl CapturedResponse {
    fn matches(&self, request: &FetchRequest) -> bool {
        self.kind == request.kind
            && self
                .service
                .as_deref()
                .map_or(true, |s| s.trim() == request.service.code())
            && self.query.trim() == request.query.trim()
            && self.backfill == request.backfill
            && (self.age.is_none() || self.age == request.age)
    }
}

#[derive(Debug, Default, Deserialize)]
struct CaptureFile {
    #[serde(default)]
    responses: Vec<CapturedResponse>,
}

/// Source replaying responses from a capture file
/// (`{"responses": [{kind, service?, query?, backfill?, age?, body?, error?, fatal?}]}`).
///
/// Queries with no captured response are skipped.
#[derive(Clone, Debug, Default)]
pub struct CapturedSource {
    responses: Vec<CapturedResponse>,
}

impl CapturedSource {
    pub fn new(responses: Vec<CapturedResponse>) -> Self {
        Self { responses }
    }

    /// Load a capture file. An unreadable or malformed file is a
    /// configuration error.
    pub fn from_file(path: &Path) -> SdkResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| SdkError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CaptureFile = serde_json::from_str(&text)?;
        Ok(Self::new(file.responses))
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

impl RecordSource for CapturedSource {
    fn fetch(&self, _upstream: &Upstream, request: &FetchRequest) -> FetchOutcome {
        let Some(captured) = self.responses.iter().find(|r| r.matches(request)) else {
            return FetchOutcome::Skipped {
                reason: "no captured response".into(),
            };
        };
        match (&captured.body, &captured.error) {
            (_, Some(error)) if captured.fatal => FetchOutcome::Fatal(error.clone()),
            (_, Some(error)) => FetchOutcome::Skipped {
                reason: error.clone(),
            },
            (Some(body), None) => FetchOutcome::Fetched(body.clone()),
            (None, None) if captured.fatal => FetchOutcome::Fatal("fatal response".into()),
            (None, None) => FetchOutcome::Skipped {
                reason: "empty response".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn capture() -> CapturedSource {
        serde_json::from_value::<CaptureFile>(json!({
            "responses": [
                {"kind": "statute", "query": "대기환경보전법", "body": {"LawSearch": {}}},
                {"kind": "statute", "query": "대기환경보전법", "backfill": true, "error": "timeout"},
                {"kind": "bill", "service": "TVBPMBILL11", "query": "대기환경보전법", "age": 22, "body": {"RESULT": {}}},
                {"kind": "bill", "service": "nzmimeepazxkubdpn", "body": {"listing": []}},
                {"kind": "notice", "query": "굴뚝", "error": "401", "fatal": true}
            ]
        }))
        .map(|f| CapturedSource::new(f.responses))
        .unwrap()
    }

    fn upstream() -> Upstream {
        Upstream::new(&RunConfig::default(), &Credentials::new("oc", "ak"))
    }

    fn search(code: &str) -> Service {
        Service::BillSearch(code.into())
    }

    #[test]
    fn replays_matching_body() {
        let out = capture().fetch(
            &upstream(),
            &FetchRequest::live(Service::LawSearch, "대기환경보전법"),
        );
        assert_eq!(out, FetchOutcome::Fetched(json!({"LawSearch": {}})));
    }

    #[test]
    fn backfill_flag_selects_response() {
        let out = capture().fetch(
            &upstream(),
            &FetchRequest::backfill(Service::LawSearch, "대기환경보전법"),
        );
        assert_eq!(out, FetchOutcome::Skipped { reason: "timeout".into() });
    }

    #[test]
    fn age_must_match_when_captured() {
        let src = capture();
        let req = FetchRequest::live(search("TVBPMBILL11"), "대기환경보전법");
        let up = upstream();
        assert!(matches!(src.fetch(&up, &req.clone().with_age(22)), FetchOutcome::Fetched(_)));
        assert!(matches!(src.fetch(&up, &req.with_age(21)), FetchOutcome::Skipped { .. }));
    }

    #[test]
    fn service_code_must_match_when_captured() {
        let src = capture();
        let other = FetchRequest::live(search("OTHER"), "대기환경보전법").with_age(22);
        assert!(matches!(src.fetch(&upstream(), &other), FetchOutcome::Skipped { .. }));
        let listing = FetchRequest::live(Service::BillListing("nzmimeepazxkubdpn".into()), "");
        assert_eq!(
            src.fetch(&upstream(), &listing),
            FetchOutcome::Fetched(json!({"listing": []}))
        );
    }

    #[test]
    fn fatal_and_missing() {
        let src = capture();
        assert_eq!(
            src.fetch(&upstream(), &FetchRequest::live(Service::AdmRulSearch, "굴뚝")),
            FetchOutcome::Fatal("401".into())
        );
        assert!(matches!(
            src.fetch(&upstream(), &FetchRequest::live(Service::AdmRulSearch, "오존")),
            FetchOutcome::Skipped { .. }
        ));
    }

    #[test]
    fn services_map_to_kinds_and_keys() {
        let up = upstream();
        assert_eq!(Service::LawSearch.kind(), RecordKind::Statute);
        assert_eq!(Service::AdmRulSearch.code(), "admrul");
        assert_eq!(search("TVBPMBILL11").kind(), RecordKind::Bill);
        assert_eq!(up.key_for(&Service::AdmRulSearch), "oc");
        assert_eq!(up.key_for(&search("TVBPMBILL11")), "ak");
        assert_eq!(
            up.endpoints_for(&Service::LawSearch),
            RunConfig::default().law_endpoints().as_slice()
        );
        assert!(up.endpoints_for(&search("TVBPMBILL11")).is_empty());
    }

    #[test]
    fn from_file_reads_capture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.json");
        fs::write(&path, r#"{"responses": [{"kind": "bill", "query": "x", "body": {}}]}"#).unwrap();
        assert_eq!(CapturedSource::from_file(&path).unwrap().len(), 1);
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            CapturedSource::from_file(&path),
            Err(SdkError::Serialization(_))
        ));
    }
}
