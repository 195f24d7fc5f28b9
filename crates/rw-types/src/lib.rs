//! Foundation types for Regulatory Watch.
//!
//! This crate provides the vocabulary shared by every other `rw-*` crate:
//! which kinds of regulatory record exist, how a classification outcome is
//! named, and how dates and detection timestamps are canonicalized.
//!
//! # Key Types
//!
//! - [`RecordKind`] -- Statute, administrative notice, or legislative bill
//! - [`ChangeStatus`] -- NEW / MOD / OK classification outcome
//! - [`RunTimestamp`] -- The instant a run started, rendered in UTC and KST
//! - [`normalize_date`] / [`date_sort_value`] -- 8-digit calendar canonicalization

pub mod date;
pub mod error;
pub mod kind;
pub mod timestamp;

pub use date::{date_sort_value, normalize_date};
pub use error::TypeError;
pub use kind::{status_label_ko, ChangeStatus, RecordKind};
pub use timestamp::{
    iso_sort_value, iso_utc_from_yyyymmdd, kst, parse_iso, yyyymmdd_from_iso, RunTimestamp,
};
