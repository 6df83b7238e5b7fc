use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use skylane_core::flight::RouteTemplate;
use skylane_shared::{FlightStatus, WeatherCondition};
use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

const MAX_PAGE_SIZE: usize = 200;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/flight-status", get(list_flight_status))
}

#[derive(Debug, Deserialize)]
struct FlightStatusQuery {
    date: Option<NaiveDate>,
    status: Option<String>,
    search: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

/// Template-joined instance row exposed to the status board.
#[derive(Debug, Serialize)]
pub struct FlightStatusRow {
    pub id: Uuid,
    pub flight_number: String,
    pub airline: String,
    pub origin: String,
    pub origin_city: String,
    pub destination: String,
    pub destination_city: String,
    pub duration: String,
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

/// The status board: the only caller of the lifecycle operations. Today's
/// requests go through the throttled single-flight sync; future dates are
/// pre-generated; past dates are served read-only.
async fn list_flight_status(
    State(state): State<AppState>,
    Query(query): Query<FlightStatusQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let today = state.clock.now().date_naive();
    let target = query.date.unwrap_or(today);

    if target == today {
        state.day_sync.sync_today(&state.lifecycle, target).await?;
    } else if target > today {
        state.lifecycle.ensure_daily_flights(target).await?;
    }

    let status_filter = match query.status.as_deref().filter(|s| *s != "ALL") {
        Some(raw) => Some(
            raw.parse::<FlightStatus>()
                .map_err(AppError::ValidationError)?,
        ),
        None => None,
    };

    let templates: HashMap<Uuid, RouteTemplate> = state
        .templates
        .list_all()
        .await
        .map_err(AppError::storage)?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    let mut rows: Vec<FlightStatusRow> = state
        .instances
        .list_by_date(target)
        .await
        .map_err(AppError::storage)?
        .into_iter()
        .filter_map(|instance| {
            let Some(template) = templates.get(&instance.template_id) else {
                warn!(instance = %instance.id, "instance references a missing template; omitted");
                return None;
            };
            Some(FlightStatusRow {
                id: instance.id,
                flight_number: template.flight_number.clone(),
                airline: template.airline.clone(),
                origin: template.origin.clone(),
                origin_city: template.origin_city.clone(),
                destination: template.destination.clone(),
                destination_city: template.destination_city.clone(),
                duration: template.duration.clone(),
                flight_date: instance.flight_date,
                status: instance.status,
                scheduled_departure: instance.scheduled_departure,
                scheduled_arrival: instance.scheduled_arrival,
                actual_departure: instance.actual_departure,
                actual_arrival: instance.actual_arrival,
                aircraft_type: instance.aircraft_type,
                aircraft_registration: instance.aircraft_registration,
                gate: instance.gate,
                terminal: instance.terminal,
                weather_origin: instance.weather_origin,
                weather_destination: instance.weather_destination,
            })
        })
        .collect();

    rows.sort_by_key(|r| r.scheduled_departure);

    if let Some(status) = status_filter {
        rows.retain(|r| r.status == status);
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        rows.retain(|r| matches_search(r, search));
    }

    match query.limit {
        Some(limit) => {
            let limit = limit.clamp(1, MAX_PAGE_SIZE);
            let offset = query.offset.unwrap_or(0);
            let (items, has_more, next_offset) = paginate(rows, limit, offset);
            Ok(Json(json!({
                "items": items,
                "has_more": has_more,
                "next_offset": next_offset,
            })))
        }
        None => Ok(Json(json!(rows))),
    }
}

fn matches_search(row: &FlightStatusRow, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    [
        row.flight_number.as_str(),
        row.origin.as_str(),
        row.origin_city.as_str(),
        row.destination.as_str(),
        row.destination_city.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

fn paginate<T>(rows: Vec<T>, limit: usize, offset: usize) -> (Vec<T>, bool, Option<usize>) {
    let total = rows.len();
    let items: Vec<T> = rows.into_iter().skip(offset).take(limit).collect();
    let has_more = offset + items.len() < total;
    let next_offset = has_more.then_some(offset + limit);
    (items, has_more, next_offset)
}
