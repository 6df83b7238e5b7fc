use async_trait::async_trait;
use skylane_core::flight::{CabinConfig, RouteTemplate};
use skylane_core::repository::{RepoError, RouteTemplateRepository};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

pub struct PostgresRouteTemplateRepository {
    pub pool: sqlx::PgPool,
}

const TEMPLATE_COLUMNS: &str = "id, flight_number, airline, origin, origin_city, \
     destination, destination_city, departure_time, arrival_time, duration, \
     aircraft_type, operating_days, \
     economy_seats, economy_price, economy_enabled, \
     premium_economy_seats, premium_economy_price, premium_economy_enabled, \
     business_seats, business_price, business_enabled, \
     first_class_seats, first_class_price, first_class_enabled";

fn template_from_row(row: &PgRow) -> Result<RouteTemplate, RepoError> {
    Ok(RouteTemplate {
        id: row.try_get("id")?,
        flight_number: row.try_get("flight_number")?,
        airline: row.try_get("airline")?,
        origin: row.try_get("origin")?,
        origin_city: row.try_get("origin_city")?,
        destination: row.try_get("destination")?,
        destination_city: row.try_get("destination_city")?,
        departure_time: row.try_get("departure_time")?,
        arrival_time: row.try_get("arrival_time")?,
        duration: row.try_get("duration")?,
        aircraft_type: row.try_get("aircraft_type")?,
        operating_days: row.try_get("operating_days")?,
        economy: CabinConfig {
            seats: row.try_get("economy_seats")?,
            price: row.try_get("economy_price")?,
            enabled: row.try_get("economy_enabled")?,
        },
        premium_economy: CabinConfig {
            seats: row.try_get("premium_economy_seats")?,
            price: row.try_get("premium_economy_price")?,
            enabled: row.try_get("premium_economy_enabled")?,
        },
        business: CabinConfig {
            seats: row.try_get("business_seats")?,
            price: row.try_get("business_price")?,
            enabled: row.try_get("business_enabled")?,
        },
        first_class: CabinConfig {
            seats: row.try_get("first_class_seats")?,
            price: row.try_get("first_class_price")?,
            enabled: row.try_get("first_class_enabled")?,
        },
    })
}

#[async_trait]
impl RouteTemplateRepository for PostgresRouteTemplateRepository {
    async fn list_all(&self) -> Result<Vec<RouteTemplate>, RepoError> {
        let sql = format!("SELECT {} FROM route_templates ORDER BY flight_number", TEMPLATE_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(template_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<RouteTemplate>, RepoError> {
        let sql = format!("SELECT {} FROM route_templates WHERE id = $1", TEMPLATE_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(template_from_row).transpose()
    }
}
