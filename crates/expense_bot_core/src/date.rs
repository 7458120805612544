//! crates/expense_bot_core/src/date.rs
//!
//! Resolves the calendar fields of a record from an optional `ddmmyy` token.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};

use crate::domain::ResolvedDate;

const MONTH_NAMES: [&str; 12] = [
    "Январь", "Февраль", "Март", "Апрель", "Май", "Июнь", "Июль", "Август", "Сентябрь",
    "Октябрь", "Ноябрь", "Декабрь",
];

/// Two-digit years below this land in the 2000s, the rest in the 1900s.
const CENTURY_THRESHOLD: i32 = 50;

/// Returns the month name for a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("Неизвестный месяц")
}

/// Maps a two-digit year onto a four-digit one.
pub fn expand_year(yy: i32) -> i32 {
    if yy < CENTURY_THRESHOLD {
        2000 + yy
    } else {
        1900 + yy
    }
}

/// Resolves `raw` (a six-digit `ddmmyy` token) or, when absent or unusable, `now`.
///
/// Day and month are not range-checked: out-of-range values roll over the same
/// way `(year, month - 1, day)` calendar arithmetic does, so `310225` is
/// 2025-03-03 and `000125` is 2024-12-31. Both paths anchor at noon UTC.
pub fn resolve_date(raw: Option<&str>, now: DateTime<Utc>) -> ResolvedDate {
    let date = raw
        .and_then(short_date_to_naive)
        .unwrap_or_else(|| now.date_naive());

    let anchored = date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default());

    ResolvedDate {
        iso_date: anchored.format("%Y-%m-%d").to_string(),
        month_name: month_name(anchored.month()).to_string(),
        year: anchored.year().to_string(),
    }
}

fn short_date_to_naive(raw: &str) -> Option<NaiveDate> {
    if !crate::parser::is_short_date(raw) {
        return None;
    }
    let day: i64 = raw.get(0..2)?.parse().ok()?;
    let month: i32 = raw.get(2..4)?.parse().ok()?;
    let yy: i32 = raw.get(4..6)?.parse().ok()?;

    let month_index = month - 1;
    let year = expand_year(yy) + month_index.div_euclid(12);
    let month0 = month_index.rem_euclid(12) as u32;

    let first = NaiveDate::from_ymd_opt(year, month0 + 1, 1)?;
    if day >= 1 {
        first.checked_add_days(Days::new((day - 1) as u64))
    } else {
        first.checked_sub_days(Days::new((1 - day) as u64))
    }
}
