//! Durable state storage for Regulatory Watch.
//!
//! The state file maps, per record kind, each identity key to the last
//! fingerprint and payload seen for it. Every run reads it whole and writes it
//! whole.
//!
//! # Storage Backends
//!
//! All backends implement the [`StateStore`] trait:
//!
//! - [`FileStateStore`] -- JSON file replaced atomically on save
//! - [`InMemoryStateStore`] -- `RwLock`-guarded snapshot for tests and embedding
//!
//! # Design Rules
//!
//! 1. Entries are never deleted; stale keys stay for provenance and fallback.
//! 2. A missing or unparseable state file loads as an empty snapshot.
//! 3. Saves go to a temporary file in the target directory, are synced, and
//!    are renamed over the canonical path. A crash leaves the previous file.
//! 4. Other I/O errors are propagated, never silently ignored.

pub mod atomic;
pub mod error;
pub mod file;
pub mod memory;
pub mod record;
pub mod traits;

pub use atomic::{read_if_exists, write_atomic, write_json_atomic};
pub use error::{StoreError, StoreResult};
pub use file::FileStateStore;
pub use memory::InMemoryStateStore;
pub use record::{StateRecord, StateSnapshot};
pub use traits::StateStore;
