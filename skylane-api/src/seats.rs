use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skylane_core::flight::RouteTemplate;
use skylane_core::occupancy;
use skylane_shared::CabinClass;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/v1/flights/{id}/seat-availability",
        get(get_seat_availability),
    )
}

#[derive(Debug, Deserialize)]
struct SeatQuery {
    date: NaiveDate,
    cabin: CabinClass,
}

/// The occupancy read surface. Derived per request, identical for the same
/// inputs on every call; nothing here writes.
#[derive(Debug, Serialize)]
pub struct SeatAvailability {
    pub flight_number: String,
    pub flight_date: NaiveDate,
    pub cabin: CabinClass,
    pub total_seats: usize,
    pub occupied_count: usize,
    pub available_count: usize,
    pub occupancy_percentage: f64,
    pub occupied_seat_indices: Vec<usize>,
}

async fn get_seat_availability(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
    Query(query): Query<SeatQuery>,
) -> Result<Json<SeatAvailability>, AppError> {
    let template = state
        .templates
        .get(template_id)
        .await
        .map_err(AppError::storage)?
        .ok_or_else(|| AppError::NotFoundError(format!("unknown flight {}", template_id)))?;

    availability_for(&template, query.date, query.cabin).map(Json)
}

fn availability_for(
    template: &RouteTemplate,
    date: NaiveDate,
    cabin: CabinClass,
) -> Result<SeatAvailability, AppError> {
    let config = template.cabin(cabin);
    if !config.enabled {
        return Err(AppError::ValidationError(format!(
            "cabin {} is not sold on flight {}",
            cabin, template.flight_number
        )));
    }

    // A non-positive configured capacity is an admin-data bug; serve an empty
    // cabin rather than failing the request path.
    debug_assert!(config.seats > 0, "enabled cabin with no seats");
    let total_seats = config.seats.max(0) as usize;
    if total_seats == 0 {
        return Ok(SeatAvailability {
            flight_number: template.flight_number.clone(),
            flight_date: date,
            cabin,
            total_seats: 0,
            occupied_count: 0,
            available_count: 0,
            occupancy_percentage: 0.0,
            occupied_seat_indices: Vec::new(),
        });
    }

    let occupied = occupancy::occupied_seats(&template.flight_number, date, cabin, total_seats);
    let mut indices: Vec<usize> = occupied.iter().copied().collect();
    indices.sort_unstable();

    Ok(SeatAvailability {
        flight_number: template.flight_number.clone(),
        flight_date: date,
        cabin,
        total_seats,
        occupied_count: indices.len(),
        available_count: total_seats - indices.len(),
        occupancy_percentage: occupancy::occupancy_percentage(
            &template.flight_number,
            date,
            cabin,
            total_seats,
        ),
        occupied_seat_indices: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use skylane_core::flight::CabinConfig;

    fn template() -> RouteTemplate {
        RouteTemplate {
            id: Uuid::from_u128(21),
            flight_number: "SK101".into(),
            airline: "Skylane Airways".into(),
            origin: "HKG".into(),
            origin_city: "Hong Kong".into(),
            destination: "NRT".into(),
            destination_city: "Tokyo".into(),
            departure_time: "10:00".into(),
            arrival_time: "14:00".into(),
            duration: "4h 0m".into(),
            aircraft_type: "A350-900".into(),
            operating_days: "1234567".into(),
            economy: CabinConfig { seats: 180, price: 3200.0, enabled: true },
            premium_economy: CabinConfig { seats: 35, price: 5400.0, enabled: true },
            business: CabinConfig { seats: 40, price: 10000.0, enabled: true },
            first_class: CabinConfig::disabled(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 20).unwrap()
    }

    #[test]
    fn availability_counts_are_internally_consistent() {
        let view = availability_for(&template(), date(), CabinClass::Economy).unwrap();
        assert_eq!(view.total_seats, 180);
        assert_eq!(view.occupied_count + view.available_count, 180);
        assert_eq!(view.occupied_seat_indices.len(), view.occupied_count);
        assert!(view.occupied_seat_indices.iter().all(|&i| i < 180));
        let expected_pct = view.occupied_count as f64 / 180.0 * 100.0;
        assert!((view.occupancy_percentage - expected_pct).abs() < 1e-9);
    }

    #[test]
    fn repeated_views_are_identical() {
        let a = availability_for(&template(), date(), CabinClass::Business).unwrap();
        let b = availability_for(&template(), date(), CabinClass::Business).unwrap();
        assert_eq!(a.occupied_seat_indices, b.occupied_seat_indices);
    }

    #[test]
    fn disabled_cabin_is_rejected() {
        let err = availability_for(&template(), date(), CabinClass::FirstClass).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
