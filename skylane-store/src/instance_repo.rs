use async_trait::async_trait;
use chrono::NaiveDate;
use skylane_core::flight::FlightInstance;
use skylane_core::repository::{FlightInstanceRepository, RepoError};
use skylane_shared::{FlightStatus, WeatherCondition};
use sqlx::postgres::PgRow;
use sqlx::Row;

pub struct PostgresFlightInstanceRepository {
    pub pool: sqlx::PgPool,
}

fn instance_from_row(row: &PgRow) -> Result<FlightInstance, RepoError> {
    let status: String = row.try_get("status")?;
    let weather_origin: String = row.try_get("weather_origin")?;
    let weather_destination: String = row.try_get("weather_destination")?;
    Ok(FlightInstance {
        id: row.try_get("id")?,
        template_id: row.try_get("template_id")?,
        flight_date: row.try_get("flight_date")?,
        status: status.parse::<FlightStatus>()?,
        scheduled_departure: row.try_get("scheduled_departure")?,
        scheduled_arrival: row.try_get("scheduled_arrival")?,
        actual_departure: row.try_get("actual_departure")?,
        actual_arrival: row.try_get("actual_arrival")?,
        aircraft_type: row.try_get("aircraft_type")?,
        aircraft_registration: row.try_get("aircraft_registration")?,
        gate: row.try_get("gate")?,
        terminal: row.try_get("terminal")?,
        weather_origin: weather_origin.parse::<WeatherCondition>()?,
        weather_destination: weather_destination.parse::<WeatherCondition>()?,
    })
}

#[async_trait]
impl FlightInstanceRepository for PostgresFlightInstanceRepository {
    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<FlightInstance>, RepoError> {
        let rows = sqlx::query(
            "SELECT id, template_id, flight_date, status, scheduled_departure, \
                    scheduled_arrival, actual_departure, actual_arrival, aircraft_type, \
                    aircraft_registration, gate, terminal, weather_origin, weather_destination \
             FROM flight_instances \
             WHERE flight_date = $1 \
             ORDER BY scheduled_departure",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(instance_from_row).collect()
    }

    async fn insert_missing(&self, instances: &[FlightInstance]) -> Result<u64, RepoError> {
        let mut inserted = 0u64;
        for instance in instances {
            // The unique (template_id, flight_date) index makes concurrent
            // creation conflict-free; a losing writer is a no-op.
            let result = sqlx::query(
                "INSERT INTO flight_instances \
                     (id, template_id, flight_date, status, scheduled_departure, \
                      scheduled_arrival, actual_departure, actual_arrival, aircraft_type, \
                      aircraft_registration, gate, terminal, weather_origin, weather_destination) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
                 ON CONFLICT (template_id, flight_date) DO NOTHING",
            )
            .bind(instance.id)
            .bind(instance.template_id)
            .bind(instance.flight_date)
            .bind(instance.status.as_str())
            .bind(instance.scheduled_departure)
            .bind(instance.scheduled_arrival)
            .bind(instance.actual_departure)
            .bind(instance.actual_arrival)
            .bind(&instance.aircraft_type)
            .bind(&instance.aircraft_registration)
            .bind(&instance.gate)
            .bind(&instance.terminal)
            .bind(instance.weather_origin.as_str())
            .bind(instance.weather_destination.as_str())
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    async fn apply_progress(&self, instance: &FlightInstance) -> Result<(), RepoError> {
        sqlx::query(
            "UPDATE flight_instances \
             SET status = $2, scheduled_departure = $3, scheduled_arrival = $4, \
                 actual_departure = $5, actual_arrival = $6, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(instance.id)
        .bind(instance.status.as_str())
        .bind(instance.scheduled_departure)
        .bind(instance.scheduled_arrival)
        .bind(instance.actual_departure)
        .bind(instance.actual_arrival)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
