//! Ledger rows.
//!
//! Rows persist for years and older writers stored numbers where strings are
//! expected today, so every scalar field deserializes leniently and unknown
//! fields are carried through untouched.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use rw_index::ChangeItem;
use rw_types::{iso_utc_from_yyyymmdd, normalize_date, status_label_ko};

/// Separator between the components of a history key.
pub const HISTORY_KEY_SEPARATOR: &str = "||";

/// How a ledger row entered the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntrySource {
    /// Detected by a regular run.
    Delta,
    /// Reconstructed by the one-time historical backfill.
    Backfill,
    /// Written by some other producer; kept verbatim.
    Other(String),
}

impl EntrySource {
    pub fn as_str(&self) -> &str {
        match self {
            EntrySource::Delta => "delta",
            EntrySource::Backfill => "backfill",
            EntrySource::Other(s) => s,
        }
    }
}

impl From<String> for EntrySource {
    fn from(s: String) -> Self {
        match s.as_str() {
            "delta" => EntrySource::Delta,
            "backfill" => EntrySource::Backfill,
            _ => EntrySource::Other(s),
        }
    }
}

impl From<EntrySource> for String {
    fn from(source: EntrySource) -> Self {
        source.as_str().to_string()
    }
}

impl fmt::Display for EntrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One durable ledger row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status_ko: String,
    /// Localized kind label (`법령`, `고시`, `의안`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub diff_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub change_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_source")]
    pub source: Option<EntrySource>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub detected_at_utc: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub history_key: String,
    /// Fields this version does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HistoryEntry {
    /// Convert a classified item into a ledger row.
    ///
    /// The detection timestamp is the item's own, else midnight of its date,
    /// else `fallback_detected_at`.
    pub fn from_change_item(
        item: &ChangeItem,
        source: EntrySource,
        fallback_detected_at: &str,
    ) -> Self {
        let mut entry = Self {
            status: item.status.code().to_string(),
            status_ko: item.status_ko.clone(),
            kind: item.kind.label().to_string(),
            title: item.title.clone(),
            date: item.date.clone(),
            id: item.id.clone(),
            diff_url: item.diff_url.clone(),
            link: Some(item.link.clone()).filter(|l| !l.is_empty()),
            change_summary: item.change_summary.clone().unwrap_or_default(),
            source: Some(source),
            detected_at_utc: item.detected_at_utc.clone().unwrap_or_default(),
            history_key: String::new(),
            extra: Map::new(),
        };
        entry.normalize(fallback_detected_at);
        entry
    }

    /// Canonicalize the row in place: normalized date, defaulted status and
    /// label, defaulted detection timestamp, history key filled in.
    ///
    /// Applying it twice is the same as applying it once.
    pub fn normalize(&mut self, fallback_detected_at: &str) {
        self.date = normalize_date(&self.date);
        if self.status.trim().is_empty() {
            self.status = "MOD".to_string();
        }
        if self.status_ko.trim().is_empty() {
            self.status_ko = status_label_ko(&self.status).to_string();
        }
        let detected = self.detected_at_utc.trim();
        self.detected_at_utc = if !detected.is_empty() {
            detected.to_string()
        } else {
            iso_utc_from_yyyymmdd(&self.date).unwrap_or_else(|| fallback_detected_at.to_string())
        };
        let key = self.history_key.trim();
        self.history_key = if key.is_empty() {
            history_key(&self.kind, &self.id, &self.date, &self.title)
        } else {
            key.to_string()
        };
    }
}

/// Ledger dedup key: `kind||id||date||title`.
pub fn history_key(kind: &str, id: &str, date: &str, title: &str) -> String {
    [kind.trim(), id.trim(), &normalize_date(date), title.trim()].join(HISTORY_KEY_SEPARATOR)
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(value_to_string(Value::deserialize(d)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(value_to_string(Value::deserialize(d)?))
}

/// A scalar becomes a source; null and containers read as absent.
fn lenient_source<'de, D: Deserializer<'de>>(d: D) -> Result<Option<EntrySource>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(EntrySource::from(s)),
        scalar @ (Value::Number(_) | Value::Bool(_)) => Some(EntrySource::from(scalar.to_string())),
        _ => None,
    })
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
