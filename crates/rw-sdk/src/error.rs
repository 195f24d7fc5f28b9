use std::path::PathBuf;

use thiserror::Error;

use rw_types::RecordKind;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("{0} missing: set it in the environment")]
    MissingCredential(&'static str),

    #[error("fatal fetch failure for {kind} query {query:?}: {reason}")]
    FetchFatal {
        kind: RecordKind,
        query: String,
        reason: String,
    },

    #[error("health file not found: {0}")]
    HealthMissing(PathBuf),

    #[error("health file unusable: {0}")]
    HealthInvalid(String),

    #[error("store error: {0}")]
    Store(#[from] rw_store::StoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] rw_ledger::LedgerError),

    #[error("diff error: {0}")]
    Diff(#[from] rw_diff::DiffError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
