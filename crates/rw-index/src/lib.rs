//! Status classifier for Regulatory Watch.
//!
//! Compares each freshly fetched record against the fingerprint stored for
//! its identity key, decides whether it is new, modified, or unchanged, and
//! records the current fingerprint and payload back into the state snapshot.
//!
//! # Key Types
//!
//! - [`Classifier`] -- Per-run classifier bound to the mutable state snapshot
//! - [`Detection`] -- A classified item plus its pending diff artifact
//! - [`ChangeItem`] -- Published classification result
//! - [`fallback_items`] -- Placeholders re-emitted from state when a fetch is empty

pub mod classify;
pub mod fallback;
pub mod item;
pub mod summary;

pub use classify::{classify, status_for, Classifier, Detection};
pub use fallback::{fallback_items, fallback_note};
pub use item::{kind_label, ChangeItem};
pub use summary::{change_summary, NEW_SUMMARY, NO_FIELD_CHANGE_SUMMARY};
