use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use skylane_shared::{CabinClass, FlightStatus, WeatherCondition};
use uuid::Uuid;

use crate::schedule::{self, ScheduleError};

/// Sellable inventory and pricing for one cabin of a template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CabinConfig {
    pub seats: i32,
    pub price: f64,
    pub enabled: bool,
}

impl CabinConfig {
    pub fn disabled() -> Self {
        Self {
            seats: 0,
            price: 0.0,
            enabled: false,
        }
    }
}

/// Static, date-independent flight schedule definition. Created and edited by
/// the admin surface; read-only to this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteTemplate {
    pub id: Uuid,
    pub flight_number: String,
    pub airline: String,
    pub origin: String,
    pub origin_city: String,
    pub destination: String,
    pub destination_city: String,
    /// Local departure clock time, `"HH:MM"`.
    pub departure_time: String,
    /// Local arrival clock time, optionally `"HH:MM+N"` for overnight legs.
    pub arrival_time: String,
    /// Block time, e.g. `"8h 30m"`.
    pub duration: String,
    pub aircraft_type: String,
    /// Weekday digits this template flies, `'1'` = Monday .. `'7'` = Sunday,
    /// e.g. `"12345"` for a weekday-only rotation.
    pub operating_days: String,
    pub economy: CabinConfig,
    pub premium_economy: CabinConfig,
    pub business: CabinConfig,
    pub first_class: CabinConfig,
}

impl RouteTemplate {
    pub fn cabin(&self, cabin: CabinClass) -> &CabinConfig {
        match cabin {
            CabinClass::Economy => &self.economy,
            CabinClass::PremiumEconomy => &self.premium_economy,
            CabinClass::Business => &self.business,
            CabinClass::FirstClass => &self.first_class,
        }
    }

    /// Whether this template operates on `date`'s weekday.
    pub fn operates_on(&self, date: NaiveDate) -> bool {
        let digit = (b'0' + date.weekday().number_from_monday() as u8) as char;
        self.operating_days.contains(digit)
    }

    pub fn scheduled_departure(&self, date: NaiveDate) -> Result<DateTime<Utc>, ScheduleError> {
        schedule::departure_instant(date, &self.departure_time)
    }

    pub fn scheduled_arrival(&self, date: NaiveDate) -> Result<DateTime<Utc>, ScheduleError> {
        schedule::arrival_instant(date, &self.departure_time, &self.arrival_time)
    }

    pub fn duration_hours(&self) -> Result<f64, ScheduleError> {
        schedule::parse_duration_hours(&self.duration)
    }
}

/// One concrete occurrence of a template on one calendar date.
///
/// Identity is (template_id, flight_date); instances are created lazily,
/// advanced forward through the status machine, and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightInstance {
    pub id: Uuid,
    pub template_id: Uuid,
    pub flight_date: NaiveDate,
    pub status: FlightStatus,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: DateTime<Utc>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub aircraft_type: String,
    pub aircraft_registration: Option<String>,
    pub gate: Option<String>,
    pub terminal: Option<String>,
    pub weather_origin: WeatherCondition,
    pub weather_destination: WeatherCondition,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> RouteTemplate {
        RouteTemplate {
            id: Uuid::new_v4(),
            flight_number: "SK101".into(),
            airline: "Skylane Airways".into(),
            origin: "HKG".into(),
            origin_city: "Hong Kong".into(),
            destination: "LHR".into(),
            destination_city: "London".into(),
            departure_time: "23:45".into(),
            arrival_time: "06:30+1".into(),
            duration: "13h 45m".into(),
            aircraft_type: "A350-900".into(),
            operating_days: "1357".into(),
            economy: CabinConfig { seats: 240, price: 5800.0, enabled: true },
            premium_economy: CabinConfig { seats: 35, price: 9200.0, enabled: true },
            business: CabinConfig { seats: 40, price: 28000.0, enabled: true },
            first_class: CabinConfig::disabled(),
        }
    }

    #[test]
    fn operating_days_use_iso_weekday_digits() {
        let t = template();
        // 2026-06-22 is a Monday, 2026-06-23 a Tuesday.
        assert!(t.operates_on(NaiveDate::from_ymd_opt(2026, 6, 22).unwrap()));
        assert!(!t.operates_on(NaiveDate::from_ymd_opt(2026, 6, 23).unwrap()));
        // 2026-06-28 is a Sunday; digit 7.
        assert!(t.operates_on(NaiveDate::from_ymd_opt(2026, 6, 28).unwrap()));
    }

    #[test]
    fn overnight_arrival_composes_onto_the_next_day() {
        let t = template();
        let d = NaiveDate::from_ymd_opt(2026, 6, 22).unwrap();
        let dep = t.scheduled_departure(d).unwrap();
        let arr = t.scheduled_arrival(d).unwrap();
        assert_eq!(dep, d.and_hms_opt(23, 45, 0).unwrap().and_utc());
        assert_eq!(
            arr,
            d.succ_opt().unwrap().and_hms_opt(6, 30, 0).unwrap().and_utc()
        );
    }

    #[test]
    fn cabin_lookup_covers_all_classes() {
        let t = template();
        assert!(t.cabin(CabinClass::Economy).enabled);
        assert!(!t.cabin(CabinClass::FirstClass).enabled);
        assert_eq!(t.cabin(CabinClass::Business).seats, 40);
    }
}
