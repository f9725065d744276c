use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::domain::models::booking::{Booking, NewBooking};
use crate::domain::ports::{BookingRepository, Clock};
use crate::error::AppError;

/// Outer retry budget around the reservation transaction. Covers transient
/// infrastructure failures only; the generation-attempt budget inside the
/// transaction is separate.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}

/// Only infrastructure failures re-enter the loop. Validation, conflict and
/// session errors are deterministic and surface immediately.
pub fn is_retryable(err: &AppError) -> bool {
    matches!(err, AppError::Database(_) | AppError::Transient(_))
}

pub struct ReservationService {
    booking_repo: Arc<dyn BookingRepository>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl ReservationService {
    pub fn new(booking_repo: Arc<dyn BookingRepository>, clock: Arc<dyn Clock>) -> Self {
        Self::with_retry(booking_repo, clock, RetryPolicy::default())
    }

    pub fn with_retry(
        booking_repo: Arc<dyn BookingRepository>,
        clock: Arc<dyn Clock>,
        retry: RetryPolicy,
    ) -> Self {
        Self { booking_repo, clock, retry }
    }

    /// Confirms a selection into a durable booking. Retries the transaction
    /// with exponential backoff on transient failures; conflicts and
    /// validation errors are never retried.
    pub async fn reserve(&self, request: NewBooking) -> Result<Booking, AppError> {
        if request.start_time < self.clock.now() {
            return Err(AppError::Validation("Cannot book a slot in the past".to_string()));
        }

        let mut delay = self.retry.base_delay;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.booking_repo.reserve_slot(&request).await {
                Ok(booking) => {
                    info!(
                        code = %booking.code,
                        resource_id = %booking.resource_id,
                        attempt,
                        "Reservation committed"
                    );
                    return Ok(booking);
                }
                Err(e) if is_retryable(&e) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(AppError::Transient(format!(
                            "reservation failed after {} attempts: {}",
                            attempt, e
                        )));
                    }
                    warn!(
                        resource_id = %request.resource_id,
                        attempt,
                        "Transient reservation failure, retrying: {}",
                        e
                    );
                    sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
