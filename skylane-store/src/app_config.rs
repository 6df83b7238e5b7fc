use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub simulation: SimulationRules,
    #[serde(default)]
    pub settlement: SettlementRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Tunables for the flight-state simulation. The defaults are the documented
/// disruption constants; the seeded streams behind them are not configurable.
#[derive(Debug, Deserialize, Clone)]
pub struct SimulationRules {
    /// Minimum spacing between today-syncs triggered by the status endpoint.
    #[serde(default = "default_sync_interval")]
    pub today_sync_min_interval_secs: u64,
    /// Delay probability with benign origin weather.
    #[serde(default = "default_delay_probability")]
    pub delay_probability: f64,
    /// Delay probability when origin weather is rainy, snowy or foggy.
    #[serde(default = "default_bad_weather_delay_probability")]
    pub bad_weather_delay_probability: f64,
    /// Cancellation probability when either endpoint reports a storm.
    #[serde(default = "default_cancellation_probability")]
    pub storm_cancellation_probability: f64,
}

fn default_sync_interval() -> u64 {
    60
}
fn default_delay_probability() -> f64 {
    0.10
}
fn default_bad_weather_delay_probability() -> f64 {
    0.40
}
fn default_cancellation_probability() -> f64 {
    0.20
}

impl Default for SimulationRules {
    fn default() -> Self {
        Self {
            today_sync_min_interval_secs: default_sync_interval(),
            delay_probability: default_delay_probability(),
            bad_weather_delay_probability: default_bad_weather_delay_probability(),
            storm_cancellation_probability: default_cancellation_probability(),
        }
    }
}

/// Tunables for the mileage settlement batch.
#[derive(Debug, Deserialize, Clone)]
pub struct SettlementRules {
    /// Hours past scheduled arrival before a booking becomes settleable.
    #[serde(default = "default_buffer_hours")]
    pub arrival_buffer_hours: i64,
    /// Proxy cruise speed used to estimate distance from block time.
    #[serde(default = "default_average_speed")]
    pub average_speed_mph: f64,
    /// Interval for the in-process settlement worker; 0 disables it (an
    /// external cron hits the settlement route instead).
    #[serde(default = "default_worker_interval")]
    pub worker_interval_secs: u64,
}

fn default_buffer_hours() -> i64 {
    3
}
fn default_average_speed() -> f64 {
    500.0
}
fn default_worker_interval() -> u64 {
    0
}

impl Default for SettlementRules {
    fn default() -> Self {
        Self {
            arrival_buffer_hours: default_buffer_hours(),
            average_speed_mph: default_average_speed(),
            worker_interval_secs: default_worker_interval(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment-specific overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // `SKYLANE__SERVER__PORT=9090` style environment overrides
            .add_source(config::Environment::with_prefix("SKYLANE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_defaults_are_the_documented_constants() {
        let sim = SimulationRules::default();
        assert_eq!(sim.today_sync_min_interval_secs, 60);
        assert_eq!(sim.delay_probability, 0.10);
        assert_eq!(sim.bad_weather_delay_probability, 0.40);
        assert_eq!(sim.storm_cancellation_probability, 0.20);

        let settle = SettlementRules::default();
        assert_eq!(settle.arrival_buffer_hours, 3);
        assert_eq!(settle.average_speed_mph, 500.0);
    }
}
