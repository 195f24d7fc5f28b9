//! History merge engine for Regulatory Watch.
//!
//! The ledger is the cumulative record of every change ever detected since
//! the configured cutoff date. Each run merges its delta (and, once, a
//! reconstructed backfill) into the persisted ledger through a single pure
//! routine, [`merge_history`].
//!
//! # Guarantees
//!
//! - At most one entry per history key (`kind||id||date||title`).
//! - The entry with the latest detection timestamp wins; ties resolve the
//!   same way whatever the input order.
//! - `merge(L, merge(L, D)) == merge(L, D)`.
//! - Entries dated before the cutoff never survive a merge.
//!
//! # Key Types
//!
//! - [`HistoryEntry`] -- One durable ledger row
//! - [`Ledger`] -- Ordered rows plus seeding metadata
//! - [`MergePolicy`] -- Cutoff and fallback detection timestamp for a merge
//! - [`LedgerStore`] -- Atomic JSON persistence with legacy-format loading

pub mod entry;
pub mod error;
pub mod ledger;
pub mod merge;
pub mod seed;
pub mod store;

pub use entry::{history_key, EntrySource, HistoryEntry};
pub use error::{LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use merge::{merge_history, MergePolicy};
pub use seed::{apply_seed, backfill_entry, backfill_summary, needs_seed};
pub use store::LedgerStore;
