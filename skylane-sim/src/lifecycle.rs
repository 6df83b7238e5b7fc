//! Per-day materialization of flight instances and their status machine.
//!
//! `ensure_daily_flights` lazily creates the day's instances from the route
//! templates; `update_flight_statuses` walks them forward as wall-clock time
//! passes. Every synthetic signal (weather gating, delay, cancellation,
//! pushback jitter) is drawn from streams seeded by the instance's own
//! identity, so any number of concurrent pollers converge on the same state
//! with nothing flapping and no delay applied twice.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use skylane_core::clock::Clock;
use skylane_core::flight::{FlightInstance, RouteTemplate};
use skylane_core::repository::{FlightInstanceRepository, RepoError, RouteTemplateRepository};
use skylane_core::rng::SeededRandom;
use skylane_core::schedule::ScheduleError;
use skylane_shared::{FlightStatus, WeatherCondition};
use skylane_store::SimulationRules;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::synthesis::{self, RegistrationAllocator};

/// Boarding opens this many minutes before scheduled departure.
const BOARDING_WINDOW_MINUTES: i64 = 45;
/// Synthetic delays push the schedule by 30..=119 minutes.
const DELAY_MIN_MINUTES: i64 = 30;
const DELAY_SPAN_MINUTES: f64 = 90.0;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("storage failure: {0}")]
    Storage(#[from] RepoError),
}

/// All per-instance randomness, drawn in a fixed order from one stream so
/// repeated evaluations see identical values.
struct DisruptionRolls {
    cancel: f64,
    delay: f64,
    delay_minutes: i64,
    /// Pushback offset in minutes, -10..=20.
    departure_jitter: i64,
    /// Touchdown offset in minutes, -20..=10.
    arrival_jitter: i64,
}

fn disruption_rolls(template_id: Uuid, date: NaiveDate) -> DisruptionRolls {
    let mut rng = SeededRandom::from_key(&format!(
        "{}-{}-disruption",
        template_id,
        date.format("%Y-%m-%d")
    ));
    DisruptionRolls {
        cancel: rng.next(),
        delay: rng.next(),
        delay_minutes: DELAY_MIN_MINUTES + (rng.next() * DELAY_SPAN_MINUTES) as i64,
        departure_jitter: (rng.next() * 31.0) as i64 - 10,
        arrival_jitter: (rng.next() * 31.0) as i64 - 20,
    }
}

fn delay_prone_weather(weather: WeatherCondition) -> bool {
    matches!(
        weather,
        WeatherCondition::Rainy | WeatherCondition::Snowy | WeatherCondition::Foggy
    )
}

/// Advance one instance against `now`. Returns whether anything changed.
///
/// `base_departure` is the departure instant composed directly from the
/// template; a stored departure that differs from it means the one-shot delay
/// push was already applied.
fn advance_instance(
    instance: &mut FlightInstance,
    base_departure: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    rules: &SimulationRules,
) -> bool {
    if instance.status.is_terminal() {
        return false;
    }

    let rolls = disruption_rolls(instance.template_id, instance.flight_date);
    let before = (
        instance.status,
        instance.scheduled_departure,
        instance.scheduled_arrival,
        instance.actual_departure,
        instance.actual_arrival,
    );

    if instance.status.rank() < FlightStatus::Departed.rank() {
        let stormy = instance.weather_origin == WeatherCondition::Stormy
            || instance.weather_destination == WeatherCondition::Stormy;
        if stormy && rolls.cancel < rules.storm_cancellation_probability {
            instance.status = FlightStatus::Cancelled;
            instance.actual_departure = None;
            instance.actual_arrival = None;
            return true;
        }

        let delay_chance = if delay_prone_weather(instance.weather_origin) {
            rules.bad_weather_delay_probability
        } else {
            rules.delay_probability
        };
        if rolls.delay < delay_chance {
            if let Some(base) = base_departure {
                if instance.scheduled_departure == base {
                    instance.scheduled_departure += Duration::minutes(rolls.delay_minutes);
                    instance.scheduled_arrival += Duration::minutes(rolls.delay_minutes);
                    instance.status = FlightStatus::Delayed;
                }
            }
        }
    }

    let target = if now >= instance.scheduled_arrival {
        Some(FlightStatus::Arrived)
    } else if now >= instance.scheduled_departure {
        Some(FlightStatus::Departed)
    } else if now >= instance.scheduled_departure - Duration::minutes(BOARDING_WINDOW_MINUTES) {
        Some(FlightStatus::Boarding)
    } else {
        None
    };

    if let Some(target) = target {
        if target.rank() > instance.status.rank() {
            if target.rank() >= FlightStatus::Departed.rank() && instance.actual_departure.is_none()
            {
                instance.actual_departure =
                    Some(instance.scheduled_departure + Duration::minutes(rolls.departure_jitter));
            }
            if target == FlightStatus::Arrived && instance.actual_arrival.is_none() {
                instance.actual_arrival =
                    Some(instance.scheduled_arrival + Duration::minutes(rolls.arrival_jitter));
            }
            instance.status = target;
        }
    }

    (
        instance.status,
        instance.scheduled_departure,
        instance.scheduled_arrival,
        instance.actual_departure,
        instance.actual_arrival,
    ) != before
}

fn build_instance(
    template: &RouteTemplate,
    date: NaiveDate,
    allocator: &mut RegistrationAllocator,
) -> Result<FlightInstance, ScheduleError> {
    let scheduled_departure = template.scheduled_departure(date)?;
    let scheduled_arrival = template.scheduled_arrival(date)?;
    let (weather_origin, weather_destination) = synthesis::synthesize_weather(template.id, date);
    let (gate, terminal) = synthesis::assign_gate(template.id, date);
    let registration = allocator.allocate(&template.airline, template.id, date);

    Ok(FlightInstance {
        id: Uuid::new_v4(),
        template_id: template.id,
        flight_date: date,
        status: FlightStatus::Scheduled,
        scheduled_departure,
        scheduled_arrival,
        actual_departure: None,
        actual_arrival: None,
        aircraft_type: template.aircraft_type.clone(),
        aircraft_registration: Some(registration),
        gate: Some(gate),
        terminal: Some(terminal),
        weather_origin,
        weather_destination,
    })
}

pub struct LifecycleEngine {
    templates: Arc<dyn RouteTemplateRepository>,
    instances: Arc<dyn FlightInstanceRepository>,
    clock: Arc<dyn Clock>,
    rules: SimulationRules,
}

impl LifecycleEngine {
    pub fn new(
        templates: Arc<dyn RouteTemplateRepository>,
        instances: Arc<dyn FlightInstanceRepository>,
        clock: Arc<dyn Clock>,
        rules: SimulationRules,
    ) -> Self {
        Self {
            templates,
            instances,
            clock,
            rules,
        }
    }

    /// Make sure every template operating on `date` has its instance.
    /// Idempotent and safe under concurrent invocation: creation races are
    /// settled by the (template_id, flight_date) uniqueness in the store.
    pub async fn ensure_daily_flights(&self, date: NaiveDate) -> Result<u64, LifecycleError> {
        let templates = self.templates.list_all().await?;
        let existing = self.instances.list_by_date(date).await?;
        let existing_templates: HashSet<Uuid> = existing.iter().map(|i| i.template_id).collect();
        let mut allocator = RegistrationAllocator::new(
            existing
                .iter()
                .filter_map(|i| i.aircraft_registration.clone()),
        );

        let mut fresh = Vec::new();
        for template in templates.iter().filter(|t| t.operates_on(date)) {
            if existing_templates.contains(&template.id) {
                continue;
            }
            match build_instance(template, date, &mut allocator) {
                Ok(instance) => fresh.push(instance),
                Err(err) => {
                    warn!(
                        flight = %template.flight_number,
                        error = %err,
                        "skipping template with malformed schedule"
                    );
                }
            }
        }

        if fresh.is_empty() {
            debug!(%date, "all flight instances already present");
            return Ok(0);
        }

        fresh.sort_by_key(|i| i.scheduled_departure);
        let inserted = self.instances.insert_missing(&fresh).await?;
        info!(%date, inserted, planned = fresh.len(), "daily flight instances ensured");
        Ok(inserted)
    }

    /// Walk every non-terminal instance on `date` forward. Failures on one
    /// instance are logged and never abort the pass.
    pub async fn update_flight_statuses(&self, date: NaiveDate) -> Result<u64, LifecycleError> {
        let now = self.clock.now();
        let templates: HashMap<Uuid, RouteTemplate> = self
            .templates
            .list_all()
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();
        let instances = self.instances.list_by_date(date).await?;

        let mut updated = 0u64;
        for mut instance in instances {
            if instance.status.is_terminal() {
                continue;
            }
            let base_departure = templates
                .get(&instance.template_id)
                .and_then(|t| t.scheduled_departure(date).ok());
            if advance_instance(&mut instance, base_departure, now, &self.rules) {
                match self.instances.apply_progress(&instance).await {
                    Ok(()) => updated += 1,
                    Err(err) => {
                        warn!(instance = %instance.id, error = %err, "failed to persist status update");
                    }
                }
            }
        }
        debug!(%date, updated, "flight status pass complete");
        Ok(updated)
    }
}

struct SyncState {
    day: Option<NaiveDate>,
    last_run: Option<Instant>,
}

/// Single-flight throttle for today-syncs triggered off the polling path.
///
/// Concurrent callers for the same day share one in-flight run: the mutex is
/// held across the ensure+update pass, so late arrivals wait on the lock and
/// then skip inside the minimum interval. Crossing midnight resets the
/// window.
pub struct DaySync {
    min_interval: StdDuration,
    state: tokio::sync::Mutex<SyncState>,
}

impl DaySync {
    pub fn new(min_interval: StdDuration) -> Self {
        Self {
            min_interval,
            state: tokio::sync::Mutex::new(SyncState {
                day: None,
                last_run: None,
            }),
        }
    }

    /// Run ensure+update for `date` unless another run finished within the
    /// minimum interval. Returns whether this call actually ran the sync.
    pub async fn sync_today(
        &self,
        engine: &LifecycleEngine,
        date: NaiveDate,
    ) -> Result<bool, LifecycleError> {
        let mut state = self.state.lock().await;

        if state.day == Some(date) {
            if let Some(last_run) = state.last_run {
                if last_run.elapsed() < self.min_interval {
                    return Ok(false);
                }
            }
        } else {
            state.day = Some(date);
            state.last_run = None;
        }

        let result = async {
            engine.ensure_daily_flights(date).await?;
            engine.update_flight_statuses(date).await?;
            Ok(())
        }
        .await;

        // The window closes even on failure; the next poll past the
        // interval retries.
        state.day = Some(date);
        state.last_run = Some(Instant::now());
        result.map(|()| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rules() -> SimulationRules {
        SimulationRules::default()
    }

    /// Deterministically search for a template id whose disruption rolls
    /// satisfy a predicate, so tests can pin down fated/unfated instances.
    fn find_template_id(date: NaiveDate, predicate: impl Fn(&DisruptionRolls) -> bool) -> Uuid {
        (0u128..10_000)
            .map(Uuid::from_u128)
            .find(|id| predicate(&disruption_rolls(*id, date)))
            .expect("no template id matches the predicate in the search range")
    }

    fn flight_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 22).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 22, h, m, 0).unwrap()
    }

    fn instance(template_id: Uuid, weather: WeatherCondition) -> FlightInstance {
        FlightInstance {
            id: Uuid::new_v4(),
            template_id,
            flight_date: flight_date(),
            status: FlightStatus::Scheduled,
            scheduled_departure: at(10, 0),
            scheduled_arrival: at(14, 0),
            actual_departure: None,
            actual_arrival: None,
            aircraft_type: "A321neo".into(),
            aircraft_registration: Some("B-1234".into()),
            gate: Some("A1".into()),
            terminal: Some("T1".into()),
            weather_origin: weather,
            weather_destination: WeatherCondition::Sunny,
        }
    }

    fn quiet_template_id() -> Uuid {
        // Benign-weather chance is 0.10 and storms are absent, so any id with
        // a delay roll above 0.10 flies undisturbed.
        find_template_id(flight_date(), |r| r.delay >= 0.10 && r.cancel >= 0.20)
    }

    #[test]
    fn stays_scheduled_before_the_boarding_window() {
        let mut inst = instance(quiet_template_id(), WeatherCondition::Sunny);
        let changed = advance_instance(&mut inst, Some(at(10, 0)), at(8, 0), &rules());
        assert!(!changed);
        assert_eq!(inst.status, FlightStatus::Scheduled);
    }

    #[test]
    fn boards_forty_five_minutes_out() {
        let mut inst = instance(quiet_template_id(), WeatherCondition::Sunny);
        assert!(advance_instance(&mut inst, Some(at(10, 0)), at(9, 20), &rules()));
        assert_eq!(inst.status, FlightStatus::Boarding);
        assert!(inst.actual_departure.is_none());
    }

    #[test]
    fn departs_and_arrives_with_bounded_jitter() {
        let mut inst = instance(quiet_template_id(), WeatherCondition::Sunny);
        assert!(advance_instance(&mut inst, Some(at(10, 0)), at(10, 5), &rules()));
        assert_eq!(inst.status, FlightStatus::Departed);
        let dep = inst.actual_departure.expect("actual departure recorded");
        let dep_offset = (dep - inst.scheduled_departure).num_minutes();
        assert!((-10..=20).contains(&dep_offset), "offset {}", dep_offset);

        assert!(advance_instance(&mut inst, Some(at(10, 0)), at(14, 30), &rules()));
        assert_eq!(inst.status, FlightStatus::Arrived);
        let arr = inst.actual_arrival.expect("actual arrival recorded");
        let arr_offset = (arr - inst.scheduled_arrival).num_minutes();
        assert!((-20..=10).contains(&arr_offset), "offset {}", arr_offset);
    }

    #[test]
    fn status_never_regresses_under_repeated_updates() {
        let mut inst = instance(quiet_template_id(), WeatherCondition::Sunny);
        let clock_points = [
            at(8, 0),
            at(9, 20),
            at(9, 20), // repeat: no change expected
            at(10, 1),
            at(14, 1),
            at(18, 0),
        ];
        let mut last_rank = 0u8;
        for now in clock_points {
            advance_instance(&mut inst, Some(at(10, 0)), now, &rules());
            assert!(
                inst.status.rank() >= last_rank,
                "status regressed to {} at {}",
                inst.status,
                now
            );
            last_rank = inst.status.rank();
        }
        assert_eq!(inst.status, FlightStatus::Arrived);
    }

    #[test]
    fn fated_delay_applies_exactly_once() {
        // Rainy origin raises the delay chance to 0.40; storms stay off.
        let id = find_template_id(flight_date(), |r| r.delay < 0.40 && r.cancel >= 0.20);
        let rolls = disruption_rolls(id, flight_date());
        let mut inst = instance(id, WeatherCondition::Rainy);

        assert!(advance_instance(&mut inst, Some(at(10, 0)), at(8, 0), &rules()));
        assert_eq!(inst.status, FlightStatus::Delayed);
        let pushed_departure = at(10, 0) + Duration::minutes(rolls.delay_minutes);
        assert_eq!(inst.scheduled_departure, pushed_departure);
        assert!((30..=119).contains(&rolls.delay_minutes));

        // A second poll must not stack another push.
        advance_instance(&mut inst, Some(at(10, 0)), at(8, 1), &rules());
        assert_eq!(inst.scheduled_departure, pushed_departure);
    }

    #[test]
    fn delayed_flight_reenters_the_sequence_against_pushed_times() {
        let id = find_template_id(flight_date(), |r| r.delay < 0.40 && r.cancel >= 0.20);
        let rolls = disruption_rolls(id, flight_date());
        let mut inst = instance(id, WeatherCondition::Rainy);

        advance_instance(&mut inst, Some(at(10, 0)), at(8, 0), &rules());
        assert_eq!(inst.status, FlightStatus::Delayed);

        let pushed_departure = at(10, 0) + Duration::minutes(rolls.delay_minutes);
        let in_window = pushed_departure - Duration::minutes(10);
        advance_instance(&mut inst, Some(at(10, 0)), in_window, &rules());
        assert_eq!(inst.status, FlightStatus::Boarding);

        advance_instance(&mut inst, Some(at(10, 0)), pushed_departure, &rules());
        assert_eq!(inst.status, FlightStatus::Departed);
    }

    #[test]
    fn storms_can_cancel_before_departure() {
        let id = find_template_id(flight_date(), |r| r.cancel < 0.20);
        let mut inst = instance(id, WeatherCondition::Stormy);

        assert!(advance_instance(&mut inst, Some(at(10, 0)), at(8, 0), &rules()));
        assert_eq!(inst.status, FlightStatus::Cancelled);
        assert!(inst.actual_departure.is_none());

        // Terminal: nothing moves afterwards.
        assert!(!advance_instance(&mut inst, Some(at(10, 0)), at(14, 30), &rules()));
        assert_eq!(inst.status, FlightStatus::Cancelled);
    }

    #[test]
    fn clear_weather_ignores_the_cancel_roll() {
        let id = find_template_id(flight_date(), |r| r.cancel < 0.20 && r.delay >= 0.10);
        let mut inst = instance(id, WeatherCondition::Sunny);
        advance_instance(&mut inst, Some(at(10, 0)), at(10, 5), &rules());
        assert_eq!(inst.status, FlightStatus::Departed);
    }

    #[test]
    fn arrived_instances_are_left_alone() {
        let mut inst = instance(quiet_template_id(), WeatherCondition::Sunny);
        inst.status = FlightStatus::Arrived;
        inst.actual_departure = Some(at(10, 2));
        inst.actual_arrival = Some(at(13, 55));
        assert!(!advance_instance(&mut inst, Some(at(10, 0)), at(23, 0), &rules()));
    }
}
