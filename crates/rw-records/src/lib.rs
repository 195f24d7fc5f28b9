//! Record normalization for Regulatory Watch.
//!
//! Upstream services return loosely shaped JSON whose field names drift
//! between API revisions. This crate converts those bodies into fixed-shape
//! records at the ingestion boundary and derives, for every record, the keys
//! the rest of the pipeline relies on.
//!
//! # Key Types
//!
//! - [`Record`] -- Tagged variant over [`StatuteRecord`], [`NoticeRecord`], [`BillRecord`]
//! - [`RecordFilter`] -- Department and keyword scoping of notices and bills
//! - [`parse_statutes`] / [`parse_notices`] / [`parse_bills`] -- Response body parsers
//!
//! # Derived Keys
//!
//! | kind    | identity key     | fingerprint                              |
//! |---------|------------------|------------------------------------------|
//! | statute | title            | `promulgation_date\|promulgation_no\|reform_type` |
//! | notice  | `title::number`  | `promulgation_date\|enforce_date\|number` |
//! | bill    | bill id          | `bill_no\|proc_result\|propose_date`     |

pub mod assembly;
pub mod error;
pub mod filter;
pub mod parse;
pub mod record;

pub use assembly::assembly_age;
pub use error::{RecordError, RecordResult};
pub use filter::{normalize_name, RecordFilter};
pub use parse::{parse_bills, parse_notices, parse_statutes};
pub use record::{BillRecord, ChangeField, NoticeRecord, Record, StatuteRecord};
