pub mod sqlite_resource_repo;
pub mod sqlite_service_repo;
pub mod sqlite_booking_repo;

pub mod postgres_resource_repo;
pub mod postgres_service_repo;
pub mod postgres_booking_repo;

/// 2067 = SQLite unique constraint, 23505 = PostgreSQL unique violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| {
            let code = db.code().unwrap_or_default();
            code == "2067" || code == "23505"
        })
        .unwrap_or(false)
}

/// Attempts budget for booking-code generation inside one reservation
/// transaction, independent of the outer retry budget.
pub const CODE_GENERATION_ATTEMPTS: u32 = 10;
