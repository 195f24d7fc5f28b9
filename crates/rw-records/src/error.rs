//! Error types for the records crate.

use rw_types::RecordKind;

/// Errors that can occur while converting upstream or persisted data.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The response body did not contain the expected container.
    #[error("unexpected {kind} response shape: {reason}")]
    UnexpectedShape { kind: RecordKind, reason: String },

    /// A persisted payload could not be decoded into a record.
    #[error("invalid {kind} payload: {source}")]
    Payload {
        kind: RecordKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience alias for record results.
pub type RecordResult<T> = Result<T, RecordError>;
