use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::dtos::requests::SelectSlotRequest;
use crate::api::dtos::responses::{ConflictResponse, SelectionAck};
use crate::domain::models::resource::Resource;
use crate::domain::models::selection::{session_key, PendingSelection};
use crate::domain::services::alternatives::{find_alternatives, DEFAULT_ALTERNATIVE_LIMIT};
use crate::domain::services::availability::resolve_start_utc;
use crate::domain::services::working_hours::{check_slot_within_hours, HoursVerdict};
use crate::error::AppError;
use crate::state::AppState;

/// Records a customer's chosen slot as a pending selection, after the initial
/// free-slot check. The selection only becomes a booking on confirm.
pub async fn select_slot(
    State(state): State<Arc<AppState>>,
    Path(resource_id): Path<String>,
    Json(payload): Json<SelectSlotRequest>,
) -> Result<Response, AppError> {
    let resource = state
        .resource_repo
        .find_by_id(&resource_id)
        .await?
        .ok_or(AppError::NotFound("Resource not found".into()))?;
    if !resource.active {
        return Err(AppError::Validation("Resource is not accepting bookings".into()));
    }

    let service = state
        .service_repo
        .find_by_id(&payload.service_id)
        .await?
        .ok_or(AppError::NotFound("Service not found".into()))?;
    if service.duration_min <= 0 {
        return Err(AppError::Validation("Service has no valid duration".into()));
    }

    let date = NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".into()))?;
    let time = parse_local_time(&resource, &payload.time)?;

    let start = resolve_start_utc(&resource, date, time)
        .ok_or(AppError::Validation("Invalid local time (ambiguous or skipped due to DST)".into()))?;
    let end = start + Duration::minutes(service.duration_min as i64);

    let now = state.clock.now();
    if start < now {
        return Err(AppError::Validation("Cannot select a slot in the past".into()));
    }

    match check_slot_within_hours(&resource, date.weekday(), time, service.duration_min as i64) {
        HoursVerdict::Inside => {}
        HoursVerdict::DegradedOpen => {
            warn!(resource_id = %resource.id, "Admitting slot against malformed template");
        }
        HoursVerdict::Outside(reason) => return Err(AppError::Validation(reason)),
    }

    if let Some(existing) = state.booking_repo.find_conflicting(&resource.id, start, end).await? {
        let alternatives = find_alternatives(
            state.booking_repo.as_ref(),
            &resource,
            service.duration_min as i64,
            date,
            DEFAULT_ALTERNATIVE_LIMIT,
            now,
        )
        .await?;

        return Ok((
            StatusCode::CONFLICT,
            Json(ConflictResponse {
                error: "conflict".to_string(),
                conflicting_booking: existing.code,
                alternatives: alternatives.iter().map(|s| s.to_rfc3339()).collect(),
            }),
        )
            .into_response());
    }

    let selection = PendingSelection {
        resource_id: resource.id.clone(),
        service_id: service.id.clone(),
        date,
        time,
        created_at: now,
    };
    let key = session_key(&payload.customer_id, &resource.id);
    state.selection_store.put(&key, selection).await?;

    let expires_at = now + Duration::minutes(state.config.session_ttl_minutes);
    info!(resource_id = %resource.id, start = %start, "Pending selection stored");

    Ok(Json(SelectionAck {
        status: "selected".to_string(),
        resource_id: resource.id,
        start: start.to_rfc3339(),
        expires_at: expires_at.to_rfc3339(),
    })
    .into_response())
}

/// Accepts `HH:MM` in the resource's local time, or a full RFC3339 timestamp
/// converted into it.
fn parse_local_time(resource: &Resource, raw: &str) -> Result<NaiveTime, AppError> {
    if raw.contains('T') {
        let tz: Tz = resource.timezone.parse().unwrap_or(chrono_tz::UTC);
        let dt = chrono::DateTime::parse_from_rfc3339(raw)
            .map_err(|_| AppError::Validation("Invalid ISO time format".into()))?;
        Ok(dt.with_timezone(&tz).time())
    } else {
        NaiveTime::parse_from_str(raw, "%H:%M")
            .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))
    }
}
