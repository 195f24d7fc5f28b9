//! Staleness check against the health artifact.

use std::path::Path;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::debug;

use rw_store::read_if_exists;
use rw_types::{kst, parse_iso};

use crate::artifacts::{HealthArtifact, HEALTH_FILE};
use crate::error::{SdkError, SdkResult};

/// Default maximum age of the last successful run, in minutes.
pub const DEFAULT_DELAY_THRESHOLD_MIN: u64 = 75;

/// Age of the last successful run.
#[derive(Clone, Debug, PartialEq)]
pub struct DelayReport {
    pub last_success_kst: DateTime<FixedOffset>,
    pub now_kst: DateTime<FixedOffset>,
    pub elapsed_minutes: f64,
    pub threshold_minutes: u64,
}

impl DelayReport {
    /// Returns `true` when the last success is older than the threshold.
    pub fn is_exceeded(&self) -> bool {
        self.elapsed_minutes > self.threshold_minutes as f64
    }
}

/// Measure how long ago the run publishing into `out_dir` last succeeded.
///
/// A missing health file, an empty `last_success_kst`, or an unparseable
/// timestamp is an error.
pub fn check_delay(out_dir: &Path, threshold_minutes: u64, now: DateTime<Utc>) -> SdkResult<DelayReport> {
    let path = out_dir.join(HEALTH_FILE);
    let text = read_if_exists(&path)?.ok_or_else(|| SdkError::HealthMissing(path.clone()))?;
    let health: HealthArtifact = serde_json::from_str(&text)
        .map_err(|e| SdkError::HealthInvalid(format!("{}: {e}", path.display())))?;

    let raw = health.last_success_kst.trim();
    if raw.is_empty() {
        return Err(SdkError::HealthInvalid("last_success_kst empty".into()));
    }
    let last = parse_iso(raw)
        .ok_or_else(|| SdkError::HealthInvalid(format!("last_success_kst unparseable: {raw}")))?;

    let elapsed_minutes = (now - last).num_milliseconds() as f64 / 60_000.0;
    let report = DelayReport {
        last_success_kst: last.with_timezone(&kst()),
        now_kst: now.with_timezone(&kst()),
        elapsed_minutes,
        threshold_minutes,
    };
    debug!(
        elapsed_minutes = report.elapsed_minutes,
        threshold_minutes,
        exceeded = report.is_exceeded(),
        "delay measured"
    );
    Ok(report)
}
