pub mod models;

pub use models::{BookingStatus, CabinClass, FlightStatus, WeatherCondition};
