use crate::domain::models::booking::{self, Booking, NewBooking};
use crate::domain::ports::BookingRepository;
use crate::error::AppError;
use crate::infra::repositories::{is_unique_violation, CODE_GENERATION_ATTEMPTS};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;

const OVERLAP_SQL: &str =
    "SELECT * FROM bookings WHERE resource_id = $1 AND status IN ('CONFIRMED', 'PENDING', 'IN_PROGRESS') \
     AND start_time < $3 AND end_time > $2 ORDER BY start_time ASC";

// The in-transaction re-check spells out all three interval relationships
// (starts during, ends during, contains) instead of relying on a single
// inequality.
const TX_CONFLICT_SQL: &str =
    "SELECT * FROM bookings WHERE resource_id = $1 AND status IN ('CONFIRMED', 'PENDING', 'IN_PROGRESS') AND (\
        (start_time <= $2 AND end_time > $2) OR \
        (start_time < $3 AND end_time >= $3) OR \
        (start_time >= $2 AND end_time <= $3)\
     ) ORDER BY start_time ASC LIMIT 1";

const INSERT_SQL: &str =
    "INSERT INTO bookings (id, resource_id, service_id, customer_id, code, start_time, end_time, status, price, created_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *";

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn list_occupying_in_range(
        &self,
        resource_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(OVERLAP_SQL)
            .bind(resource_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_conflicting(
        &self,
        resource_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(TX_CONFLICT_SQL)
            .bind(resource_id)
            .bind(start)
            .bind(end)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn reserve_slot(&self, request: &NewBooking) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Serializes all reservation attempts for this resource. Two
        // concurrent confirmations cannot both pass the re-check below.
        let locked = sqlx::query("SELECT id FROM resources WHERE id = $1 FOR UPDATE")
            .bind(&request.resource_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if locked.is_none() {
            return Err(AppError::NotFound(format!("Resource {} not found", request.resource_id)));
        }

        let conflicting = sqlx::query_as::<_, Booking>(TX_CONFLICT_SQL)
            .bind(&request.resource_id)
            .bind(request.start_time)
            .bind(request.end_time)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if let Some(existing) = conflicting {
            // Dropping tx rolls back
            return Err(AppError::SlotTaken { conflicting_code: existing.code });
        }

        let mut created = None;
        for _ in 0..CODE_GENERATION_ATTEMPTS {
            let candidate = booking::generate_code();
            let taken = sqlx::query("SELECT 1 FROM bookings WHERE code = $1")
                .bind(&candidate)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            if taken.is_some() {
                continue;
            }

            let row = Booking::from_request(request, candidate);
            match sqlx::query_as::<_, Booking>(INSERT_SQL)
                .bind(&row.id)
                .bind(&row.resource_id)
                .bind(&row.service_id)
                .bind(&row.customer_id)
                .bind(&row.code)
                .bind(row.start_time)
                .bind(row.end_time)
                .bind(&row.status)
                .bind(row.price)
                .bind(row.created_at)
                .fetch_one(&mut *tx)
                .await
            {
                Ok(b) => {
                    created = Some(b);
                    break;
                }
                Err(e) if is_unique_violation(&e) => {
                    warn!(code = %row.code, "Booking code collided on insert, resampling");
                    continue;
                }
                Err(e) => return Err(AppError::Database(e)),
            }
        }

        let Some(created) = created else {
            return Err(AppError::CodeGenerationExhausted);
        };

        sqlx::query("UPDATE resources SET booking_count = booking_count + 1 WHERE id = $1")
            .bind(&request.resource_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }
}
