use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The kind of upstream regulatory record.
///
/// Ordering follows the published display order: statutes first, then
/// administrative notices, then bills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A statute, enforcement decree, or enforcement rule.
    Statute,
    /// An administrative rule or public notice issued by a ministry.
    Notice,
    /// A bill pending in or processed by the national assembly.
    Bill,
}

impl RecordKind {
    /// All kinds, in display order.
    pub const ALL: [RecordKind; 3] = [RecordKind::Statute, RecordKind::Notice, RecordKind::Bill];

    /// The localized label used in published artifacts and history keys.
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Statute => "법령",
            RecordKind::Notice => "고시",
            RecordKind::Bill => "의안",
        }
    }

    /// Resolve a kind from its localized label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == label.trim())
    }

    /// The section name used for this kind in the persisted state file.
    pub fn state_section(&self) -> &'static str {
        match self {
            RecordKind::Statute => "laws",
            RecordKind::Notice => "admruls",
            RecordKind::Bill => "bills",
        }
    }

    /// Stable lowercase name (`statute`, `notice`, `bill`).
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Statute => "statute",
            RecordKind::Notice => "notice",
            RecordKind::Bill => "bill",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "statute" | "law" | "laws" => Ok(RecordKind::Statute),
            "notice" | "admrul" | "admruls" => Ok(RecordKind::Notice),
            "bill" | "bills" => Ok(RecordKind::Bill),
            _ => RecordKind::from_label(s).ok_or_else(|| TypeError::UnknownKind(s.to_string())),
        }
    }
}

/// Classification outcome of comparing a record against its prior state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeStatus {
    /// No prior state existed for the identity key.
    #[serde(rename = "NEW")]
    New,
    /// The fingerprint differs from the stored one.
    #[serde(rename = "MOD")]
    Modified,
    /// The fingerprint matches the stored one.
    #[serde(rename = "OK")]
    Unchanged,
}

impl ChangeStatus {
    /// Wire code (`NEW`, `MOD`, `OK`).
    pub fn code(&self) -> &'static str {
        match self {
            ChangeStatus::New => "NEW",
            ChangeStatus::Modified => "MOD",
            ChangeStatus::Unchanged => "OK",
        }
    }

    /// Localized display label.
    pub fn label_ko(&self) -> &'static str {
        match self {
            ChangeStatus::New => "신규",
            ChangeStatus::Modified => "변경",
            ChangeStatus::Unchanged => "유지",
        }
    }

    /// Precedence when the same item is reported more than once in a run.
    pub fn rank(&self) -> u8 {
        match self {
            ChangeStatus::New => 3,
            ChangeStatus::Modified => 2,
            ChangeStatus::Unchanged => 1,
        }
    }

    /// Returns `true` for NEW and MOD.
    pub fn is_change(&self) -> bool {
        !matches!(self, ChangeStatus::Unchanged)
    }

    /// Parse a wire code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "NEW" => Some(ChangeStatus::New),
            "MOD" => Some(ChangeStatus::Modified),
            "OK" => Some(ChangeStatus::Unchanged),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ChangeStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| TypeError::UnknownStatus(s.to_string()))
    }
}

/// Localized label for a raw status code; unknown codes read as "changed".
pub fn status_label_ko(code: &str) -> &'static str {
    ChangeStatus::from_code(code)
        .unwrap_or(ChangeStatus::Modified)
        .label_ko()
}
