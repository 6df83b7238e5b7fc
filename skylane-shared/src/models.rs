use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cabin classes a route template can sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    FirstClass,
}

impl CabinClass {
    pub const ALL: [CabinClass; 4] = [
        CabinClass::Economy,
        CabinClass::PremiumEconomy,
        CabinClass::Business,
        CabinClass::FirstClass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "ECONOMY",
            CabinClass::PremiumEconomy => "PREMIUM_ECONOMY",
            CabinClass::Business => "BUSINESS",
            CabinClass::FirstClass => "FIRST_CLASS",
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CabinClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ECONOMY" => Ok(CabinClass::Economy),
            "PREMIUM_ECONOMY" => Ok(CabinClass::PremiumEconomy),
            "BUSINESS" => Ok(CabinClass::Business),
            "FIRST_CLASS" => Ok(CabinClass::FirstClass),
            other => Err(format!("unknown cabin class: {}", other)),
        }
    }
}

/// Operational status of a single flight occurrence.
///
/// SCHEDULED -> BOARDING -> DEPARTED -> ARRIVED, with DELAYED re-entering the
/// sequence once its offset is applied and CANCELLED terminal from any
/// pre-departure state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    Scheduled,
    Boarding,
    Departed,
    Delayed,
    Arrived,
    Cancelled,
}

impl FlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "SCHEDULED",
            FlightStatus::Boarding => "BOARDING",
            FlightStatus::Departed => "DEPARTED",
            FlightStatus::Delayed => "DELAYED",
            FlightStatus::Arrived => "ARRIVED",
            FlightStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FlightStatus::Arrived | FlightStatus::Cancelled)
    }

    /// Progression rank; a status update never moves to a lower rank.
    /// DELAYED shares the pre-boarding rank because a delayed flight
    /// re-enters the boarding/departure sequence against its pushed times.
    pub fn rank(&self) -> u8 {
        match self {
            FlightStatus::Scheduled | FlightStatus::Delayed => 0,
            FlightStatus::Boarding => 1,
            FlightStatus::Departed => 2,
            FlightStatus::Arrived | FlightStatus::Cancelled => 3,
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" => Ok(FlightStatus::Scheduled),
            "BOARDING" => Ok(FlightStatus::Boarding),
            "DEPARTED" => Ok(FlightStatus::Departed),
            "DELAYED" => Ok(FlightStatus::Delayed),
            "ARRIVED" => Ok(FlightStatus::Arrived),
            "CANCELLED" => Ok(FlightStatus::Cancelled),
            other => Err(format!("unknown flight status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    CheckedIn,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::CheckedIn => "CHECKED_IN",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        }
    }

    /// Statuses that still accrue mileage once the flight has landed.
    pub fn is_settleable(&self) -> bool {
        matches!(
            self,
            BookingStatus::Confirmed | BookingStatus::CheckedIn | BookingStatus::Completed
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CHECKED_IN" => Ok(BookingStatus::CheckedIn),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "COMPLETED" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

/// Synthetic weather code attached to an instance endpoint at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
    Foggy,
}

impl WeatherCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "SUNNY",
            WeatherCondition::Cloudy => "CLOUDY",
            WeatherCondition::Rainy => "RAINY",
            WeatherCondition::Stormy => "STORMY",
            WeatherCondition::Snowy => "SNOWY",
            WeatherCondition::Foggy => "FOGGY",
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeatherCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUNNY" => Ok(WeatherCondition::Sunny),
            "CLOUDY" => Ok(WeatherCondition::Cloudy),
            "RAINY" => Ok(WeatherCondition::Rainy),
            "STORMY" => Ok(WeatherCondition::Stormy),
            "SNOWY" => Ok(WeatherCondition::Snowy),
            "FOGGY" => Ok(WeatherCondition::Foggy),
            other => Err(format!("unknown weather condition: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cabin_class_wire_format_round_trips() {
        let json = serde_json::to_string(&CabinClass::PremiumEconomy).unwrap();
        assert_eq!(json, "\"PREMIUM_ECONOMY\"");
        let back: CabinClass = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CabinClass::PremiumEconomy);
    }

    #[test]
    fn flight_status_ranks_are_monotone_along_the_happy_path() {
        assert!(FlightStatus::Scheduled.rank() < FlightStatus::Boarding.rank());
        assert!(FlightStatus::Boarding.rank() < FlightStatus::Departed.rank());
        assert!(FlightStatus::Departed.rank() < FlightStatus::Arrived.rank());
        assert_eq!(FlightStatus::Delayed.rank(), FlightStatus::Scheduled.rank());
    }

    #[test]
    fn terminal_statuses() {
        assert!(FlightStatus::Arrived.is_terminal());
        assert!(FlightStatus::Cancelled.is_terminal());
        assert!(!FlightStatus::Delayed.is_terminal());
    }

    #[test]
    fn settleable_statuses_match_the_batch_filter() {
        assert!(BookingStatus::Confirmed.is_settleable());
        assert!(BookingStatus::CheckedIn.is_settleable());
        assert!(BookingStatus::Completed.is_settleable());
        assert!(!BookingStatus::Cancelled.is_settleable());
    }

    #[test]
    fn status_strings_parse_back() {
        for s in ["SCHEDULED", "BOARDING", "DEPARTED", "DELAYED", "ARRIVED", "CANCELLED"] {
            let status: FlightStatus = s.parse().unwrap();
            assert_eq!(status.as_str(), s);
        }
        assert!("IN_AIR".parse::<FlightStatus>().is_err());
    }
}
