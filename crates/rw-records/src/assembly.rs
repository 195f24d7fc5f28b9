//! National assembly term arithmetic.

use chrono::{Datelike, NaiveDate};

const BASE_AGE: u32 = 21;
const BASE_START: (i32, u32, u32) = (2020, 5, 30);
const TERM_YEARS: i32 = 4;

/// The assembly age (numbered legislative term) in session on `today`.
///
/// The 21st assembly opened on 2020-05-30 and each term runs four years.
/// Dates before that clamp to 21.
pub fn assembly_age(today: NaiveDate) -> u32 {
    let (year, month, day) = BASE_START;
    let mut years = today.year() - year;
    if (today.month(), today.day()) < (month, day) {
        years -= 1;
    }
    if years < 0 {
        return BASE_AGE;
    }
    BASE_AGE + (years / TERM_YEARS) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn before_base_is_21() {
        assert_eq!(assembly_age(d(2019, 1, 1)), 21);
        assert_eq!(assembly_age(d(2020, 5, 29)), 21);
    }

    #[test]
    fn term_boundaries() {
        assert_eq!(assembly_age(d(2020, 5, 30)), 21);
        assert_eq!(assembly_age(d(2024, 5, 29)), 21);
        assert_eq!(assembly_age(d(2024, 5, 30)), 22);
        assert_eq!(assembly_age(d(2028, 5, 30)), 23);
    }
}
