//! Error types for the diff crate.

/// Errors that can occur while publishing diff artifacts.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// Writing the artifact failed.
    #[error("store error: {0}")]
    Store(#[from] rw_store::StoreError),

    /// The artifact name would escape the diff directory.
    #[error("invalid artifact name: {0}")]
    InvalidName(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
