use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::responses::SlotsResponse;
use crate::domain::services::availability::{compute_slots, day_bounds_utc};
use crate::error::AppError;
use crate::state::AppState;

/// Read-only slot listing. An unknown or inactive resource, or an unknown
/// service, means "no availability" rather than an error.
pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Path(resource_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let date_str = params.get("date").ok_or(AppError::Validation("Date required".into()))?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".into()))?;
    let service_id = params
        .get("service_id")
        .ok_or(AppError::Validation("service_id required".into()))?;

    let empty = SlotsResponse { date: date_str.clone(), slots: Vec::new() };

    let Some(resource) = state.resource_repo.find_by_id(&resource_id).await? else {
        return Ok(Json(empty));
    };
    if !resource.active {
        info!(resource_id = %resource.id, "Slot request for inactive resource");
        return Ok(Json(empty));
    }
    let Some(service) = state.service_repo.find_by_id(service_id).await? else {
        return Ok(Json(empty));
    };

    let (day_start, day_end) = day_bounds_utc(&resource, date)
        .ok_or(AppError::Validation("Invalid date for resource timezone".into()))?;

    let bookings = state
        .booking_repo
        .list_occupying_in_range(&resource.id, day_start, day_end)
        .await?;

    let now = state.clock.now();
    let slots = compute_slots(
        &resource,
        date,
        service.duration_min as i64,
        &bookings,
        state.config.slot_granularity_min,
        now,
    );

    Ok(Json(SlotsResponse {
        date: date_str.clone(),
        slots: slots.iter().map(|s| s.to_rfc3339()).collect(),
    }))
}
