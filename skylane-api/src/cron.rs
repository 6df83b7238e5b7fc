use axum::{extract::State, routing::post, Json, Router};
use serde_json::json;
use skylane_sim::SettlementError;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/cron/process-points", post(process_points))
}

/// External-scheduler entry point for the settlement batch. Takes no
/// arguments; returns the per-run summary for monitoring.
async fn process_points(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    match state.settlement.run().await {
        Ok(summary) => Ok(Json(json!({
            "success": true,
            "processed": summary.processed,
            "total_pending": summary.total_pending,
        }))),
        Err(SettlementError::AlreadyRunning) => Err(AppError::ConflictError(
            "a settlement pass is already running".to_string(),
        )),
        Err(err) => Err(AppError::InternalServerError(err.to_string())),
    }
}
