//! Parsing and composition of template schedule strings.
//!
//! Route templates store local clock times as strings (`"23:45"`), arrivals
//! optionally carrying an overnight marker (`"06:30+1"`), and block durations
//! as `"8h 30m"`. These are admin-entered and must never panic the engine;
//! malformed values surface as [`ScheduleError`] and the affected unit is
//! skipped by callers.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid clock time {0:?}")]
    InvalidClockTime(String),

    #[error("invalid overnight marker in {0:?}")]
    InvalidDayOffset(String),

    #[error("invalid duration {0:?}")]
    InvalidDuration(String),
}

/// An arrival clock time plus how many calendar days past departure it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalSpec {
    pub time: NaiveTime,
    pub day_offset: u32,
}

/// Parse `"HH:MM"` (a bare hour like `"9:05"` is accepted).
pub fn parse_clock_time(s: &str) -> Result<NaiveTime, ScheduleError> {
    let err = || ScheduleError::InvalidClockTime(s.to_string());
    let (h, m) = s.trim().split_once(':').ok_or_else(err)?;
    let hour: u32 = h.trim().parse().map_err(|_| err())?;
    let minute: u32 = m.trim().parse().map_err(|_| err())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(err)
}

/// Parse an arrival string, splitting off a `"+N"` overnight marker if
/// present: `"06:30+1"` -> 06:30 one day after departure.
pub fn parse_arrival_time(s: &str) -> Result<ArrivalSpec, ScheduleError> {
    match s.split_once('+') {
        Some((time_part, offset_part)) => {
            let time = parse_clock_time(time_part)?;
            let day_offset: u32 = offset_part
                .trim()
                .parse()
                .map_err(|_| ScheduleError::InvalidDayOffset(s.to_string()))?;
            Ok(ArrivalSpec { time, day_offset })
        }
        None => Ok(ArrivalSpec {
            time: parse_clock_time(s)?,
            day_offset: 0,
        }),
    }
}

/// Parse a block-time string like `"8h 30m"`, `"45m"` or `"11h"` into
/// fractional hours.
pub fn parse_duration_hours(s: &str) -> Result<f64, ScheduleError> {
    let err = || ScheduleError::InvalidDuration(s.to_string());
    let mut hours = 0.0;
    let mut matched = false;
    for token in s.split_whitespace() {
        if let Some(h) = token.strip_suffix('h') {
            hours += h.parse::<f64>().map_err(|_| err())?;
            matched = true;
        } else if let Some(m) = token.strip_suffix('m') {
            hours += m.parse::<f64>().map_err(|_| err())? / 60.0;
            matched = true;
        } else {
            return Err(err());
        }
    }
    if !matched {
        return Err(err());
    }
    Ok(hours)
}

/// Compose a departure instant from the flight date and the template's
/// departure clock time.
pub fn departure_instant(date: NaiveDate, departure: &str) -> Result<DateTime<Utc>, ScheduleError> {
    let time = parse_clock_time(departure)?;
    Ok(date.and_time(time).and_utc())
}

/// Compose an arrival instant, honoring an explicit `"+N"` overnight marker.
/// Without a marker, an arrival clock time earlier than departure still rolls
/// to the next day (a red-eye entered without the marker).
pub fn arrival_instant(
    date: NaiveDate,
    departure: &str,
    arrival: &str,
) -> Result<DateTime<Utc>, ScheduleError> {
    let dep_time = parse_clock_time(departure)?;
    let spec = parse_arrival_time(arrival)?;
    let mut instant = date.and_time(spec.time).and_utc();
    if spec.day_offset > 0 {
        instant += Duration::days(spec.day_offset as i64);
    } else if spec.time < dep_time {
        instant += Duration::days(1);
    }
    Ok(instant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_clock_times() {
        let t = parse_clock_time("23:45").unwrap();
        assert_eq!((t.hour(), t.minute()), (23, 45));
        assert!(parse_clock_time("25:00").is_err());
        assert!(parse_clock_time("noon").is_err());
        assert!(parse_clock_time("12").is_err());
    }

    #[test]
    fn arrival_with_overnight_marker() {
        let spec = parse_arrival_time("06:30+1").unwrap();
        assert_eq!(spec.day_offset, 1);
        assert_eq!((spec.time.hour(), spec.time.minute()), (6, 30));

        let spec = parse_arrival_time("05:10+2").unwrap();
        assert_eq!(spec.day_offset, 2);

        assert!(parse_arrival_time("06:30+x").is_err());
    }

    #[test]
    fn red_eye_lands_next_day() {
        // Departing 23:45 with arrival "06:30+1" on D arrives D+1 06:30.
        let arr = arrival_instant(date(2026, 3, 10), "23:45", "06:30+1").unwrap();
        assert_eq!(arr, date(2026, 3, 11).and_hms_opt(6, 30, 0).unwrap().and_utc());
    }

    #[test]
    fn two_day_marker_advances_two_days() {
        let arr = arrival_instant(date(2026, 3, 10), "22:00", "01:15+2").unwrap();
        assert_eq!(arr, date(2026, 3, 12).and_hms_opt(1, 15, 0).unwrap().and_utc());
    }

    #[test]
    fn missing_marker_still_rolls_over_when_arrival_precedes_departure() {
        let arr = arrival_instant(date(2026, 3, 10), "23:45", "06:30").unwrap();
        assert_eq!(arr, date(2026, 3, 11).and_hms_opt(6, 30, 0).unwrap().and_utc());
    }

    #[test]
    fn same_day_arrival_stays_same_day() {
        let arr = arrival_instant(date(2026, 3, 10), "08:00", "11:20").unwrap();
        assert_eq!(arr, date(2026, 3, 10).and_hms_opt(11, 20, 0).unwrap().and_utc());
    }

    #[test]
    fn durations_parse_to_fractional_hours() {
        assert_eq!(parse_duration_hours("8h 0m").unwrap(), 8.0);
        assert_eq!(parse_duration_hours("2h 30m").unwrap(), 2.5);
        assert_eq!(parse_duration_hours("45m").unwrap(), 0.75);
        assert_eq!(parse_duration_hours("11h").unwrap(), 11.0);
        assert!(parse_duration_hours("eight hours").is_err());
        assert!(parse_duration_hours("").is_err());
    }
}
