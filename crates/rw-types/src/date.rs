//! Calendar date canonicalization.
//!
//! Upstream services report dates in many shapes (`2022-05-05`,
//! `2022.05.05.`, `20220505`, timestamps). Every date in the system is
//! reduced to its first eight ASCII digits before comparison.

/// Strip every non-digit character and keep at most eight digits.
///
/// Returns an empty string when the input has no digits.
pub fn normalize_date(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).take(8).collect()
}

/// Numeric value of a normalized date for ordering; empty sorts as 0.
pub fn date_sort_value(text: &str) -> u32 {
    normalize_date(text).parse().unwrap_or(0)
}
