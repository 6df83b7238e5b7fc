//! Seat occupancy derived on demand, never stored.
//!
//! For a fixed (flight, date, cabin, capacity) every call returns the same
//! view, on any machine, after any restart. That contract is what lets the
//! engine skip a persistent per-seat ledger entirely: the booking path and
//! the display path both recompute and always agree.

use std::collections::HashSet;

use chrono::NaiveDate;
use skylane_shared::CabinClass;

use crate::calendar;
use crate::rng::SeededRandom;

const MIN_RATE: f64 = 0.30;
const MAX_RATE: f64 = 0.95;

/// Deterministic occupancy rate for a flight on a date, in [0.30, 0.95].
///
/// Base rate 50-70%, boosted for weekends, fixed holidays and peak-season
/// months; each boost draws from the same seeded stream in a fixed order so
/// the result is fully reproducible.
pub fn occupancy_rate(date: NaiveDate, flight_key: &str) -> f64 {
    let seed_key = format!("{}-{}-occupancy", date.format("%Y-%m-%d"), flight_key);
    let mut rng = SeededRandom::from_key(&seed_key);

    let mut rate = 0.5 + rng.next() * 0.2;

    if calendar::is_weekend(date) {
        rate += 0.1 + rng.next() * 0.1;
    }
    if calendar::is_holiday(date) {
        rate += 0.15 + rng.next() * 0.1;
    }
    if calendar::is_peak_season(date) {
        rate += 0.1 + rng.next() * 0.05;
    }

    rate.clamp(MIN_RATE, MAX_RATE)
}

/// The set of occupied seat indices for a cabin, recomputed identically on
/// every call.
///
/// Sampling is a partial Fisher-Yates: each draw removes the chosen index
/// from the remaining pool, so the set has no duplicates and stays uniform
/// over the pool at every step.
pub fn occupied_seats(
    flight_id: &str,
    date: NaiveDate,
    cabin: CabinClass,
    total_seats: usize,
) -> HashSet<usize> {
    debug_assert!(total_seats > 0, "cabin with no seats requested");
    if total_seats == 0 {
        return HashSet::new();
    }

    let seed_key = format!("{}-{}-{}", flight_id, date.format("%Y-%m-%d"), cabin);
    let mut rng = SeededRandom::from_key(&seed_key);

    let rate = occupancy_rate(date, flight_id);
    let occupied_count = (total_seats as f64 * rate) as usize;

    let mut pool: Vec<usize> = (0..total_seats).collect();
    let mut occupied = HashSet::with_capacity(occupied_count);
    for _ in 0..occupied_count {
        if pool.is_empty() {
            break;
        }
        let slot = rng.next_index(pool.len());
        occupied.insert(pool.remove(slot));
    }
    occupied
}

pub fn is_seat_occupied(
    seat_index: usize,
    flight_id: &str,
    date: NaiveDate,
    cabin: CabinClass,
    total_seats: usize,
) -> bool {
    occupied_seats(flight_id, date, cabin, total_seats).contains(&seat_index)
}

pub fn available_seats_count(
    flight_id: &str,
    date: NaiveDate,
    cabin: CabinClass,
    total_seats: usize,
) -> usize {
    total_seats - occupied_seats(flight_id, date, cabin, total_seats).len()
}

pub fn occupancy_percentage(
    flight_id: &str,
    date: NaiveDate,
    cabin: CabinClass,
    total_seats: usize,
) -> f64 {
    if total_seats == 0 {
        return 0.0;
    }
    occupied_seats(flight_id, date, cabin, total_seats).len() as f64 / total_seats as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rate_stays_in_bounds_across_a_year() {
        let mut day = date(2026, 1, 1);
        while day < date(2027, 1, 1) {
            for key in ["SK101", "SK902", "QX44"] {
                let r = occupancy_rate(day, key);
                assert!((0.30..=0.95).contains(&r), "rate {} out of bounds on {}", r, day);
            }
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn rate_is_deterministic() {
        let d = date(2026, 6, 20);
        assert_eq!(occupancy_rate(d, "SK101"), occupancy_rate(d, "SK101"));
        assert_ne!(occupancy_rate(d, "SK101"), occupancy_rate(d, "SK102"));
    }

    #[test]
    fn occupied_set_is_identical_across_calls() {
        let d = date(2026, 9, 14);
        let a = occupied_seats("SK707", d, CabinClass::Business, 42);
        let b = occupied_seats("SK707", d, CabinClass::Business, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn cardinality_matches_floor_of_rate_times_capacity() {
        let d = date(2026, 4, 9);
        for total in [1usize, 7, 180, 500] {
            let expected = (total as f64 * occupancy_rate(d, "SK330")) as usize;
            let set = occupied_seats("SK330", d, CabinClass::Economy, total);
            assert_eq!(set.len(), expected);
        }
    }

    #[test]
    fn no_duplicate_indices_up_to_five_hundred_seats() {
        let d = date(2026, 12, 25); // holiday + peak: highest fill
        let set = occupied_seats("SK888", d, CabinClass::Economy, 500);
        assert!(set.len() <= 500);
        assert!(set.iter().all(|&i| i < 500));
        // HashSet already dedupes; the real check is that the count survived
        // the draw-and-remove loop intact at the clamped max rate.
        assert_eq!(set.len(), (500.0 * occupancy_rate(d, "SK888")) as usize);
    }

    #[test]
    fn saturday_flight_lands_in_the_boosted_weekend_band() {
        // 2026-06-20 is a Saturday outside holidays and peak months, so the
        // rate is base [0.50,0.70) plus weekend [0.10,0.20): 108..=162 of 180.
        let d = date(2026, 6, 20);
        assert!(calendar::is_weekend(d));
        assert!(!calendar::is_holiday(d));
        assert!(!calendar::is_peak_season(d));

        let occupied = occupied_seats("YA101", d, CabinClass::Economy, 180);
        assert!(
            (108..=162).contains(&occupied.len()),
            "unexpected occupied count {}",
            occupied.len()
        );
    }

    #[test]
    fn cabins_get_distinct_seat_sets() {
        let d = date(2026, 5, 2);
        let economy = occupied_seats("SK550", d, CabinClass::Economy, 120);
        let business = occupied_seats("SK550", d, CabinClass::Business, 120);
        // Same count (rate ignores cabin) but different seeded layout.
        assert_eq!(economy.len(), business.len());
        assert_ne!(economy, business);
    }

    #[test]
    fn wrappers_agree_with_the_full_set() {
        let d = date(2026, 8, 1);
        let set = occupied_seats("SK220", d, CabinClass::PremiumEconomy, 64);
        assert_eq!(available_seats_count("SK220", d, CabinClass::PremiumEconomy, 64), 64 - set.len());
        let pct = occupancy_percentage("SK220", d, CabinClass::PremiumEconomy, 64);
        assert!((pct - set.len() as f64 / 64.0 * 100.0).abs() < f64::EPSILON);
        for idx in 0..64 {
            assert_eq!(
                is_seat_occupied(idx, "SK220", d, CabinClass::PremiumEconomy, 64),
                set.contains(&idx)
            );
        }
    }
}
