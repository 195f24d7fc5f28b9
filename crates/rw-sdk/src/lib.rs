//! High-level SDK for Regulatory Watch.
//!
//! Wires the record parsers, the classifier, the ledger and the state store
//! into a single run. This is the main entry point for the CLI and for
//! embedding the notifier elsewhere.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod health;
pub mod notifier;
pub mod source;

pub use artifacts::{ChangelogArtifact, HealthArtifact, SnapshotArtifact};
pub use config::{Credentials, FeatureFlags, PathsConfig, RunConfig};
pub use error::{SdkError, SdkResult};
pub use health::{check_delay, DelayReport, DEFAULT_DELAY_THRESHOLD_MIN};
pub use notifier::{Notifier, RunReport};
pub use source::{
    CapturedResponse, CapturedSource, FetchOutcome, FetchRequest, RecordSource, Service, Upstream,
};

// Re-export key types
pub use rw_types::{ChangeStatus, RecordKind, RunTimestamp};
pub use rw_ledger::{HistoryEntry, Ledger};
pub use rw_index::ChangeItem;
