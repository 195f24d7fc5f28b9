use thiserror::Error;

/// Errors produced by type conversions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown record kind: {0}")]
    UnknownKind(String),

    #[error("unknown change status: {0}")]
    UnknownStatus(String),
}
