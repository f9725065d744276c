use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::domain::models::resource::Resource;
use crate::domain::ports::BookingRepository;
use crate::domain::services::availability::{compute_slots, day_bounds_utc, DEFAULT_GRANULARITY_MIN};
use crate::error::AppError;

pub const DEFAULT_ALTERNATIVE_LIMIT: usize = 3;

/// How far ahead to look before declaring the resource exhausted.
const SEARCH_DAYS: i64 = 7;

/// On a failed reservation, re-runs the availability calculator from
/// `from_date` forward and returns up to `limit` replacement slots. An empty
/// result means the caller should communicate exhaustion, not loop.
pub async fn find_alternatives(
    booking_repo: &dyn BookingRepository,
    resource: &Resource,
    duration_min: i64,
    from_date: NaiveDate,
    limit: usize,
    now: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>, AppError> {
    let mut alternatives = Vec::new();

    for offset in 0..SEARCH_DAYS {
        let date = from_date + Duration::days(offset);
        let Some((day_start, day_end)) = day_bounds_utc(resource, date) else {
            continue;
        };

        let bookings = booking_repo
            .list_occupying_in_range(&resource.id, day_start, day_end)
            .await?;

        for slot in compute_slots(resource, date, duration_min, &bookings, DEFAULT_GRANULARITY_MIN, now) {
            alternatives.push(slot);
            if alternatives.len() >= limit {
                return Ok(alternatives);
            }
        }
    }

    Ok(alternatives)
}
