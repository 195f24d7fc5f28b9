//! One classify-then-merge pass.
//!
//! A run fetches every configured kind, classifies the records against the
//! state snapshot, merges the changes into the ledger (seeding it first when
//! required) and publishes the artifacts. Everything that can fail fatally
//! happens before the first write, so an aborted run leaves the previous
//! state, ledger, and artifacts in place.
//!
//! Persistence order: diffs, ledger, artifacts, health marker, state. A crash
//! before the state save re-detects the same changes on the next run.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use rw_diff::DiffArtifact;
use rw_index::{fallback_items, ChangeItem, Classifier};
use rw_ledger::{
    apply_seed, backfill_entry, needs_seed, EntrySource, HistoryEntry, Ledger, LedgerStore,
    MergePolicy,
};
use rw_records::{
    assembly_age, parse_bills, parse_notices, parse_statutes, Record, RecordFilter, RecordResult,
};
use rw_store::{FileStateStore, StateStore};
use rw_types::{date_sort_value, RecordKind, RunTimestamp};

use crate::artifacts::{
    count_by_kind, dedupe_items, sort_items, write_artifacts, write_health, ChangelogArtifact,
    ChangelogStats, HealthArtifact, SnapshotArtifact, SnapshotStats,
};
use crate::config::{unique_keep_order, Credentials, RunConfig};
use crate::error::{SdkError, SdkResult};
use crate::source::{FetchOutcome, FetchRequest, RecordSource, Service, Upstream};

/// Summary of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Snapshot items per kind label.
    pub count_by_kind: BTreeMap<String, usize>,
    /// NEW and MOD items merged into the ledger this run.
    pub delta: usize,
    pub history_total: usize,
    pub seeded_now: bool,
    /// Per state section, whether stored entries stood in for an empty fetch.
    pub fallback: BTreeMap<String, bool>,
    /// Diff files written this run.
    pub diffs: Vec<PathBuf>,
}

/// The notifier: configuration, upstream settings, a record source, and the
/// state backend.
pub struct Notifier<S> {
    config: RunConfig,
    upstream: Upstream,
    source: S,
    state_store: Box<dyn StateStore>,
}

impl<S: RecordSource> Notifier<S> {
    /// Create a notifier persisting state to `config.paths.state`.
    pub fn new(config: RunConfig, credentials: Credentials, source: S) -> Self {
        let state_store = Box::new(FileStateStore::new(config.paths.state.clone()));
        let upstream = Upstream::new(&config, &credentials);
        Self {
            config,
            upstream,
            source,
            state_store,
        }
    }

    /// Replace the state backend.
    pub fn with_state_store(mut self, store: Box<dyn StateStore>) -> Self {
        self.state_store = store;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute one run stamped with `at`.
    pub fn run(&self, at: &RunTimestamp) -> SdkResult<RunReport> {
        self.config.validate()?;
        self.upstream.credentials.validate(&self.config.kinds)?;

        let run_id = Uuid::now_v7();
        let span = info_span!("run", run_id = %run_id);
        let _guard = span.enter();

        let utc = at.utc_iso();
        let kst = at.kst_iso();
        let cutoff = self.config.cutoff();
        let policy = MergePolicy::new(&cutoff, utc.clone())?;
        let filter = self.config.record_filter();
        let age = self
            .config
            .assembly_age
            .unwrap_or_else(|| assembly_age(at.kst_date()));
        info!(%utc, %cutoff, age, kinds = self.config.kinds.len(), "run started");

        let mut state = self.state_store.load()?;

        let mut fetched: Vec<(RecordKind, Vec<Record>)> = Vec::new();
        for &kind in &self.config.kinds {
            let records = self.fetch_live(kind, &filter, age)?;
            info!(kind = %kind, count = records.len(), "live records fetched");
            fetched.push((kind, records));
        }

        let ledger_store = LedgerStore::new(self.config.paths.history.clone())
            .with_legacy_path(self.config.paths.legacy_changelog.clone());
        let mut ledger = ledger_store.load()?;
        let seeded_now = needs_seed(&ledger, &cutoff);
        if seeded_now {
            let backfill = self.fetch_backfill(&filter, &policy)?;
            apply_seed(&mut ledger, backfill, &policy);
        }

        let mut fallback: BTreeMap<String, bool> = RecordKind::ALL
            .iter()
            .map(|k| (k.state_section().to_string(), false))
            .collect();
        let mut items: Vec<ChangeItem> = Vec::new();
        let mut pending_diffs: Vec<DiffArtifact> = Vec::new();
        let law_names = unique_keep_order(&self.config.law_names);

        for (kind, records) in &fetched {
            if records.is_empty() {
                if state.section(*kind).is_empty() {
                    warn!(kind = %kind, "no records and nothing stored");
                    continue;
                }
                let placeholders = fallback_items(*kind, &state, &law_names);
                warn!(kind = %kind, count = placeholders.len(), "fetch empty, serving stored entries");
                fallback.insert(kind.state_section().to_string(), true);
                items.extend(placeholders);
                continue;
            }
            let mut classifier = Classifier::new(&mut state, at)
                .with_text_diff(self.config.features.enable_text_diff);
            for record in records {
                let detection = classifier.observe(record);
                items.push(detection.item);
                pending_diffs.extend(detection.diff);
            }
        }

        let mut items = dedupe_items(items);
        sort_items(&mut items);
        let delta: Vec<HistoryEntry> = items
            .iter()
            .filter(|item| item.status.is_change())
            .map(|item| HistoryEntry::from_change_item(item, EntrySource::Delta, &utc))
            .collect();
        let delta_count = delta.len();
        ledger.record_run(delta, &policy, &utc);

        let mut diffs = Vec::with_capacity(pending_diffs.len());
        for artifact in &pending_diffs {
            diffs.push(artifact.write(&self.config.paths.out_dir)?);
        }
        ledger_store.save(&ledger)?;

        let snapshot_counts = count_by_kind(items.iter().map(|i| i.kind.label()));
        let snapshot = SnapshotArtifact {
            run_id: run_id.to_string(),
            generated_at_kst: kst.clone(),
            generated_at_utc: utc.clone(),
            stats: SnapshotStats {
                count_by_kind: snapshot_counts.clone(),
                fallback: fallback.clone(),
                delta_count_this_run: delta_count,
                cumulative_history_total: ledger.len(),
                history_start_yyyymmdd: cutoff.clone(),
            },
            items,
        };
        let changelog = changelog_artifact(&ledger, &kst, &utc, &cutoff, delta_count, seeded_now);
        write_artifacts(&self.config.paths.out_dir, &snapshot, &changelog)?;
        write_health(
            &self.config.paths.out_dir,
            &HealthArtifact {
                last_success_kst: kst.clone(),
                last_success_utc: utc.clone(),
            },
        )?;

        state.last_run = Some(kst);
        self.state_store.save(&state)?;

        info!(
            items = snapshot.items.len(),
            delta = delta_count,
            history_total = ledger.len(),
            seeded_now,
            diffs = diffs.len(),
            "run complete"
        );
        Ok(RunReport {
            run_id,
            count_by_kind: snapshot_counts,
            delta: delta_count,
            history_total: ledger.len(),
            seeded_now,
            fallback,
            diffs,
        })
    }

    /// Records currently published for `kind`.
    fn fetch_live(
        &self,
        kind: RecordKind,
        filter: &RecordFilter,
        age: u32,
    ) -> SdkResult<Vec<Record>> {
        let records = match kind {
            RecordKind::Statute => {
                let mut out = Vec::new();
                for name in unique_keep_order(&self.config.law_names) {
                    let request = FetchRequest::live(Service::LawSearch, name.as_str());
                    let Some(body) = self.fetch_body(&request)? else { continue };
                    // The top hit is the current version of the named law.
                    let hit = skip_on_error(&request, parse_statutes(&body, &name))
                        .into_iter()
                        .next();
                    out.extend(hit.map(Record::Statute));
                }
                out
            }
            RecordKind::Notice => {
                let mut notices = Vec::new();
                for query in unique_keep_order(&self.config.notice_queries) {
                    let request = FetchRequest::live(Service::AdmRulSearch, query);
                    let Some(body) = self.fetch_body(&request)? else { continue };
                    notices.extend(skip_on_error(&request, parse_notices(&body)));
                }
                filter
                    .select_notices(notices)
                    .into_iter()
                    .map(Record::Notice)
                    .collect()
            }
            RecordKind::Bill => {
                let mut requests = Vec::new();
                for keyword in unique_keep_order(&self.config.bill_law_keywords) {
                    requests.push(FetchRequest::live(self.bill_search(), keyword).with_age(age));
                }
                for code in unique_keep_order(&self.config.bill_recent_services) {
                    requests.push(FetchRequest::live(Service::BillListing(code), "").with_age(age));
                }
                let mut bills = Vec::new();
                for request in &requests {
                    let Some(body) = self.fetch_body(request)? else { continue };
                    bills.extend(skip_on_error(request, parse_bills(&body)));
                }
                filter
                    .select_bills(bills, self.config.bill_limit)
                    .into_iter()
                    .map(Record::Bill)
                    .collect()
            }
        };
        Ok(records)
    }

    /// Historical records dated on or after the cutoff, as ledger rows.
    fn fetch_backfill(
        &self,
        filter: &RecordFilter,
        policy: &MergePolicy,
    ) -> SdkResult<Vec<HistoryEntry>> {
        let cutoff = date_sort_value(policy.cutoff());
        let in_range = |date: &str| date_sort_value(date) >= cutoff;
        let mut records: Vec<Record> = Vec::new();

        for &kind in &self.config.kinds {
            let before = records.len();
            match kind {
                RecordKind::Statute => {
                    for name in unique_keep_order(&self.config.law_names) {
                        let request = FetchRequest::backfill(Service::LawSearch, name.as_str());
                        let Some(body) = self.fetch_body(&request)? else { continue };
                        records.extend(
                            skip_on_error(&request, parse_statutes(&body, &name))
                                .into_iter()
                                .filter(|r| in_range(&r.promulgation_date))
                                .map(Record::Statute),
                        );
                    }
                }
                RecordKind::Notice => {
                    let mut notices = Vec::new();
                    for query in unique_keep_order(&self.config.notice_queries) {
                        let request = FetchRequest::backfill(Service::AdmRulSearch, query);
                        let Some(body) = self.fetch_body(&request)? else { continue };
                        notices.extend(
                            skip_on_error(&request, parse_notices(&body))
                                .into_iter()
                                .filter(|n| in_range(&n.promulgation_date)),
                        );
                    }
                    records.extend(filter.select_notices(notices).into_iter().map(Record::Notice));
                }
                RecordKind::Bill => {
                    let mut seen = HashSet::new();
                    for &age in &self.config.bill_history_ages {
                        for keyword in unique_keep_order(&self.config.bill_law_keywords) {
                            let request =
                                FetchRequest::backfill(self.bill_search(), keyword).with_age(age);
                            let Some(body) = self.fetch_body(&request)? else { continue };
                            records.extend(
                                skip_on_error(&request, parse_bills(&body))
                                    .into_iter()
                                    .filter(|b| filter.accepts_bill_title(&b.title))
                                    .filter(|b| in_range(&b.propose_date))
                                    .filter(|b| {
                                        seen.insert(format!("{}|{}", b.bill_id, b.propose_date))
                                    })
                                    .map(Record::Bill),
                            );
                        }
                    }
                }
            }
            debug!(kind = %kind, count = records.len() - before, "backfill records collected");
        }

        Ok(records
            .iter()
            .map(|record| backfill_entry(record, policy))
            .collect())
    }

    fn bill_search(&self) -> Service {
        Service::BillSearch(self.config.bill_search_service.trim().to_string())
    }

    fn fetch_body(&self, request: &FetchRequest) -> SdkResult<Option<Value>> {
        match self.source.fetch(&self.upstream, request) {
            FetchOutcome::Fetched(body) => Ok(Some(body)),
            FetchOutcome::Skipped { reason } => {
                warn!(
                    kind = %request.kind,
                    service = %request.service,
                    query = %request.query,
                    backfill = request.backfill,
                    %reason,
                    "query skipped"
                );
                Ok(None)
            }
            FetchOutcome::Fatal(reason) => Err(SdkError::FetchFatal {
                kind: request.kind,
                query: request.query.clone(),
                reason,
            }),
        }
    }
}

fn skip_on_error<T>(request: &FetchRequest, parsed: RecordResult<Vec<T>>) -> Vec<T> {
    parsed.unwrap_or_else(|e| {
        warn!(
            kind = %request.kind,
            service = %request.service,
            query = %request.query,
            backfill = request.backfill,
            error = %e,
            "response unparseable, query skipped"
        );
        Vec::new()
    })
}

fn changelog_artifact(
    ledger: &Ledger,
    kst: &str,
    utc: &str,
    cutoff: &str,
    delta_count: usize,
    seeded_now: bool,
) -> ChangelogArtifact {
    ChangelogArtifact {
        generated_at_kst: kst.to_string(),
        generated_at_utc: utc.to_string(),
        range_start_yyyymmdd: cutoff.to_string(),
        stats: ChangelogStats {
            count_by_kind: count_by_kind(ledger.items.iter().map(|e| e.kind.as_str())),
            delta_count_this_run: delta_count,
            total_cumulative: ledger.len(),
            seeded_now,
        },
        items: ledger.items.clone(),
    }
}
