//! Detection and generation timestamps.
//!
//! Timestamps are carried as ISO-8601 strings in persisted artifacts so that
//! legacy rows survive untouched. Comparison always goes through
//! [`iso_sort_value`], which maps anything unparseable to zero instead of
//! failing.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, SecondsFormat, Utc,
};

use crate::date::normalize_date;

/// Offset of Korea Standard Time from UTC, in seconds.
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

/// The Korea Standard Time offset.
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// The instant a run started.
///
/// A run stamps every artifact, every delta entry, and the health file with
/// the same instant so that a single run is recognizable across outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunTimestamp {
    at: DateTime<Utc>,
}

impl RunTimestamp {
    /// Capture the current wall-clock time.
    pub fn now() -> Self {
        Self { at: Utc::now() }
    }

    /// Use an explicit instant (tests, replays).
    pub fn from_utc(at: DateTime<Utc>) -> Self {
        Self { at }
    }

    /// The underlying UTC instant.
    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    /// `2024-01-02T03:04:05.678Z`
    pub fn utc_iso(&self) -> String {
        self.at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// `2024-01-02T12:04:05.678+09:00`
    pub fn kst_iso(&self) -> String {
        self.at
            .with_timezone(&kst())
            .to_rfc3339_opts(SecondsFormat::Millis, false)
    }

    /// Calendar date of this instant in KST.
    pub fn kst_date(&self) -> NaiveDate {
        self.at.with_timezone(&kst()).date_naive()
    }
}

/// Parse an ISO-8601 timestamp into UTC.
///
/// Accepts RFC 3339 (`Z` or numeric offsets), naive date-times (read as UTC),
/// and bare dates (midnight UTC).
pub fn parse_iso(text: &str) -> Option<DateTime<Utc>> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Milliseconds since the UNIX epoch for ordering; malformed input is 0.
pub fn iso_sort_value(text: &str) -> i64 {
    parse_iso(text).map(|dt| dt.timestamp_millis()).unwrap_or(0)
}

/// Midnight UTC of an 8-digit date, or `None` when the date is incomplete.
pub fn iso_utc_from_yyyymmdd(date: &str) -> Option<String> {
    let digits = normalize_date(date);
    if digits.len() != 8 {
        return None;
    }
    Some(format!(
        "{}-{}-{}T00:00:00Z",
        &digits[0..4],
        &digits[4..6],
        &digits[6..8]
    ))
}

/// The date component of an ISO timestamp, as up to eight digits.
pub fn yyyymmdd_from_iso(iso: &str) -> String {
    normalize_date(iso)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> RunTimestamp {
        RunTimestamp::from_utc(Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap())
    }

    #[test]
    fn utc_iso_has_millis_and_z() {
        assert_eq!(fixed().utc_iso(), "2024-03-01T18:30:00.000Z");
    }

    #[test]
    fn kst_iso_crosses_midnight() {
        assert_eq!(fixed().kst_iso(), "2024-03-02T03:30:00.000+09:00");
        assert_eq!(fixed().kst_date(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn sort_value_of_malformed_is_zero() {
        assert_eq!(iso_sort_value(""), 0);
        assert_eq!(iso_sort_value("not a date"), 0);
        assert_eq!(iso_sort_value("2024-13-45T00:00:00Z"), 0);
    }

    #[test]
    fn sort_value_respects_offsets() {
        let utc = iso_sort_value("2024-03-01T18:30:00Z");
        let kst = iso_sort_value("2024-03-02T03:30:00+09:00");
        assert_eq!(utc, kst);
        assert!(iso_sort_value("2024-03-01T18:30:00.001Z") > utc);
    }

    #[test]
    fn sort_value_accepts_naive_and_date_only() {
        assert_eq!(
            iso_sort_value("2022-05-05T00:00:00"),
            iso_sort_value("2022-05-05T00:00:00Z")
        );
        assert_eq!(
            iso_sort_value("2022-05-05"),
            iso_sort_value("2022-05-05T00:00:00Z")
        );
    }

    #[test]
    fn midnight_from_date() {
        assert_eq!(
            iso_utc_from_yyyymmdd("2022.05.05").as_deref(),
            Some("2022-05-05T00:00:00Z")
        );
        assert_eq!(iso_utc_from_yyyymmdd("2022"), None);
        assert_eq!(iso_utc_from_yyyymmdd(""), None);
    }

    #[test]
    fn date_component_of_iso() {
        assert_eq!(yyyymmdd_from_iso("2022-05-05T10:00:00Z"), "20220505");
        assert_eq!(yyyymmdd_from_iso(""), "");
    }
}
