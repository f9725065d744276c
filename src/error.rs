use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Slot already booked (conflicts with {conflicting_code})")]
    SlotTaken { conflicting_code: String },
    #[error("No pending selection for this customer")]
    SessionExpired,
    #[error("Transient failure: {0}")]
    Transient(String),
    #[error("Could not generate a unique booking code")]
    CodeGenerationExhausted,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let code = db_err.code().unwrap_or_default();

                    // 2067 = SQLite Unique Constraint
                    // 23505 = PostgreSQL Unique Violation
                    if code == "2067" || code == "23505" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({ "error": "Resource already exists (duplicate entry)" }))
                        ).into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::SlotTaken { conflicting_code } => (
                StatusCode::CONFLICT,
                json!({ "error": "conflict", "conflicting_booking": conflicting_code }),
            ),
            AppError::SessionExpired => (
                StatusCode::GONE,
                json!({ "error": "session_expired" }),
            ),
            AppError::Transient(msg) => {
                error!("Transient failure surfaced to caller: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "transient", "detail": msg }),
                )
            }
            AppError::CodeGenerationExhausted => {
                error!("Booking code generation budget exhausted");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "code_generation_exhausted" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
