//! Calendar heuristics feeding the occupancy model.

use chrono::{Datelike, NaiveDate, Weekday};

/// Year-agnostic (month, day) holiday table.
const HOLIDAYS: [(u32, u32); 7] = [
    (1, 1),   // New Year's Day
    (2, 14),  // Valentine's Day
    (4, 5),   // Qingming
    (5, 1),   // Labour Day
    (6, 1),   // Children's Day
    (10, 1),  // National Day
    (12, 25), // Christmas
];

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_holiday(date: NaiveDate) -> bool {
    HOLIDAYS
        .iter()
        .any(|&(m, d)| date.month() == m && date.day() == d)
}

/// Peak travel months: summer break (Jul-Aug), winter break and Lunar New
/// Year window (Dec-Feb), and the October golden week.
pub fn is_peak_season(date: NaiveDate) -> bool {
    matches!(date.month(), 7 | 8 | 12 | 1 | 2 | 10)
}
