use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Duration;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::dtos::requests::ConfirmRequest;
use crate::api::dtos::responses::ConflictResponse;
use crate::domain::models::booking::NewBooking;
use crate::domain::models::selection::session_key;
use crate::domain::services::alternatives::{find_alternatives, DEFAULT_ALTERNATIVE_LIMIT};
use crate::domain::services::availability::resolve_start_utc;
use crate::error::AppError;
use crate::state::AppState;

/// Confirms the customer's pending selection into a booking. The selection is
/// consumed on success and on conflict; a conflict response carries up to
/// three alternative slots.
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(resource_id): Path<String>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Response, AppError> {
    let key = session_key(&payload.customer_id, &resource_id);
    let selection = state
        .selection_store
        .get(&key)
        .await?
        .ok_or(AppError::SessionExpired)?;

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
        .find_by_id(&selection.service_id)
        .await?
        .ok_or(AppError::NotFound("Service not found".into()))?;

    let start = resolve_start_utc(&resource, selection.date, selection.time)
        .ok_or(AppError::Validation("Invalid local time (ambiguous or skipped due to DST)".into()))?;

    let request = NewBooking {
        resource_id: resource.id.clone(),
        service_id: service.id.clone(),
        customer_id: payload.customer_id.clone(),
        start_time: start,
        end_time: start + Duration::minutes(service.duration_min as i64),
        price: service.price,
    };

    match state.reservation.reserve(request).await {
        Ok(booking) => {
            state.selection_store.clear(&key).await?;
            info!(code = %booking.code, resource_id = %resource.id, "Booking confirmed");
            Ok(Json(booking).into_response())
        }
        Err(AppError::SlotTaken { conflicting_code }) => {
            // The stale selection is no longer valid either way
            state.selection_store.clear(&key).await?;
            warn!(
                resource_id = %resource.id,
                conflicting = %conflicting_code,
                "Confirmation lost the slot, offering alternatives"
            );

            let alternatives = find_alternatives(
                state.booking_repo.as_ref(),
                &resource,
                service.duration_min as i64,
                selection.date,
                DEFAULT_ALTERNATIVE_LIMIT,
                state.clock.now(),
            )
            .await?;

            Ok((
                StatusCode::CONFLICT,
                Json(ConflictResponse {
                    error: "conflict".to_string(),
                    conflicting_booking: conflicting_code,
                    alternatives: alternatives.iter().map(|s| s.to_rfc3339()).collect(),
                }),
            )
                .into_response())
        }
        Err(e) => Err(e),
    }
}
