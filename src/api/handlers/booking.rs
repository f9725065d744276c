use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::state::AppState;

/// Read side for collaborators holding a booking code.
pub async fn get_booking_by_code(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_repo
        .find_by_code(&code)
        .await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    Ok(Json(booking))
}
