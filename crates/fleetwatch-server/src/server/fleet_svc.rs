//! Inspection results and vehicle metadata handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use tracing::{info, instrument};

use super::AppState;
use super::error::ApiError;
use crate::auth::Identity;
use crate::storage::{InspectionChecklist, InspectionResult, RouteInfo, ScheduleRecord};

/// `GET /results`: all inspection results, newest first.
pub async fn list_results(
    State(state): State<AppState>,
) -> Result<Json<Vec<InspectionResult>>, ApiError> {
    Ok(Json(state.db.list_results().await?))
}

/// `POST /results`: record a checklist under the caller's name.
#[instrument(skip(state, identity, checklist), fields(user = %identity.subject))]
pub async fn add_result(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(checklist): Json<InspectionChecklist>,
) -> Result<(StatusCode, Json<InspectionResult>), ApiError> {
    if checklist.bus_number.trim().is_empty() {
        return Err(ApiError::BadRequest("bus number must not be empty".into()));
    }

    let result = state.db.create_result(&identity.subject, &checklist).await?;
    info!(
        id = result.id,
        bus_number = %result.bus_number,
        ready = result.vehicle_ready,
        "Inspection recorded"
    );
    Ok((StatusCode::CREATED, Json(result)))
}

/// `GET /transports`: every known vehicle.
pub async fn list_transports(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScheduleRecord>>, ApiError> {
    Ok(Json(state.db.list_vehicles().await?))
}

/// `GET /routes/{id}`: routes served by bus `id`. Unknown buses yield `[]`.
pub async fn routes_for_bus(
    State(state): State<AppState>,
    Path(bus_number): Path<String>,
) -> Result<Json<Vec<RouteInfo>>, ApiError> {
    Ok(Json(state.db.get_routes_for_bus(&bus_number).await?))
}
