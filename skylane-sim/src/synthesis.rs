//! Creation-time attribute synthesis for flight instances.
//!
//! Weather, gate/terminal and aircraft registration are derived once per
//! (template, date) from dedicated seeded streams, so regenerating the same
//! day on another node produces byte-identical instances.

use std::collections::HashSet;

use chrono::NaiveDate;
use skylane_core::rng::SeededRandom;
use skylane_shared::WeatherCondition;
use uuid::Uuid;

/// Registration prefixes by airline name fragment.
const AIRLINE_REG_PREFIXES: [(&str, &str); 9] = [
    ("Skylane", "B"),
    ("Emirates", "A6"),
    ("Lufthansa", "D"),
    ("British Airways", "G"),
    ("Singapore Airlines", "9V"),
    ("ANA", "JA"),
    ("Japan Airlines", "JA"),
    ("United Airlines", "N"),
    ("Qantas", "VH"),
];

fn registration_prefix(airline: &str) -> &'static str {
    AIRLINE_REG_PREFIXES
        .iter()
        .find(|(fragment, _)| airline.contains(fragment))
        .map(|(_, prefix)| *prefix)
        .unwrap_or("B")
}

fn weather_from_draw(u: f64) -> WeatherCondition {
    if u > 0.95 {
        WeatherCondition::Stormy
    } else if u > 0.9 {
        WeatherCondition::Snowy
    } else if u > 0.8 {
        WeatherCondition::Foggy
    } else if u > 0.6 {
        WeatherCondition::Rainy
    } else if u > 0.3 {
        WeatherCondition::Cloudy
    } else {
        WeatherCondition::Sunny
    }
}

/// Stable (origin, destination) weather pair for an instance.
pub fn synthesize_weather(template_id: Uuid, date: NaiveDate) -> (WeatherCondition, WeatherCondition) {
    let mut rng = SeededRandom::from_key(&format!("{}-{}-weather", template_id, date.format("%Y-%m-%d")));
    (weather_from_draw(rng.next()), weather_from_draw(rng.next()))
}

/// Stable (gate, terminal) assignment: gates A1..E20, terminals T1/T2.
pub fn assign_gate(template_id: Uuid, date: NaiveDate) -> (String, String) {
    let mut rng = SeededRandom::from_key(&format!("{}-{}-gate", template_id, date.format("%Y-%m-%d")));
    let letter = (b'A' + rng.next_index(5) as u8) as char;
    let number = rng.next_index(20) + 1;
    let terminal = rng.next_index(2) + 1;
    (format!("{}{}", letter, number), format!("T{}", terminal))
}

/// Hands out registrations unique within one day's generation batch.
pub struct RegistrationAllocator {
    used: HashSet<String>,
}

impl RegistrationAllocator {
    /// Seed the allocator with registrations already present on the day so a
    /// partially-generated date cannot hand one out twice.
    pub fn new(already_used: impl IntoIterator<Item = String>) -> Self {
        Self {
            used: already_used.into_iter().collect(),
        }
    }

    /// Deterministic registration like `B-4821`: one seeded draw for the
    /// number, then a linear probe over the 1000..9999 band on collision.
    pub fn allocate(&mut self, airline: &str, template_id: Uuid, date: NaiveDate) -> String {
        let prefix = registration_prefix(airline);
        let mut rng = SeededRandom::from_key(&format!(
            "{}-{}-registration",
            template_id,
            date.format("%Y-%m-%d")
        ));
        let start = 1000 + rng.next_index(9000);
        for step in 0..9000 {
            let number = 1000 + (start - 1000 + step) % 9000;
            let reg = format!("{}-{}", prefix, number);
            if self.used.insert(reg.clone()) {
                return reg;
            }
        }
        // 9000 tail numbers exhausted for one prefix in one day; fall back to
        // a template-qualified form that cannot collide.
        let reg = format!("{}-{}", prefix, &template_id.simple().to_string()[..4]);
        self.used.insert(reg.clone());
        reg
    }
}
