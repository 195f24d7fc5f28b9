/// Errors produced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid cutoff date {0:?}: expected YYYYMMDD")]
    InvalidCutoff(String),

    #[error("store error: {0}")]
    Store(#[from] rw_store::StoreError),
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
