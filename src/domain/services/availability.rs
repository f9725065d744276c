use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::domain::models::booking::Booking;
use crate::domain::models::resource::Resource;
use crate::domain::services::working_hours::{schedule_for, DayAvailability};

pub const DEFAULT_GRANULARITY_MIN: i64 = 15;

fn resource_tz(resource: &Resource) -> Tz {
    resource.timezone.parse().unwrap_or(chrono_tz::UTC)
}

/// UTC bounds of the resource's local calendar day. None when the local
/// midnight does not exist (DST edge).
pub fn day_bounds_utc(resource: &Resource, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let tz = resource_tz(resource);
    let start = tz.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).single()?;
    let end = tz.from_local_datetime(&date.and_hms_opt(23, 59, 59)?).single()?;
    Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

/// Resolves a local date+time in the resource's timezone to UTC. None for
/// ambiguous or skipped local times.
pub fn resolve_start_utc(resource: &Resource, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    let tz = resource_tz(resource);
    tz.from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Computes the ordered bookable start-times for one resource and local date.
///
/// Candidates walk the day's working window in `granularity_min` steps and
/// are dropped when they cross a break, overlap an occupying booking
/// (half-open intervals), or lie before `now`. Recomputed fresh on every
/// call; the weekday comes from the supplied local date, not a UTC shift.
pub fn compute_slots(
    resource: &Resource,
    date: NaiveDate,
    duration_min: i64,
    existing_bookings: &[Booking],
    granularity_min: i64,
    now: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    if duration_min <= 0 || granularity_min <= 0 {
        return Vec::new();
    }

    let schedule = match schedule_for(resource, date.weekday()) {
        DayAvailability::Closed => return Vec::new(),
        DayAvailability::MalformedFallbackOpen => {
            // Nothing to enumerate without windows; the fallback-open policy
            // only applies to the point check on the selection path.
            warn!(resource_id = %resource.id, "No enumerable windows for malformed template");
            return Vec::new();
        }
        DayAvailability::Open(s) => s,
    };

    let tz = resource_tz(resource);
    let day_start_min = minutes_of(schedule.start);
    let day_end_min = minutes_of(schedule.end);

    let mut slots = Vec::new();
    let mut cursor = day_start_min;

    while cursor + duration_min <= day_end_min {
        let candidate_start = cursor;
        let candidate_end = cursor + duration_min;
        cursor += granularity_min;

        let in_break = schedule.breaks.iter().any(|(b_start, b_end)| {
            candidate_start < minutes_of(*b_end) && minutes_of(*b_start) < candidate_end
        });
        if in_break {
            continue;
        }

        let Some(time) = NaiveTime::from_hms_opt((candidate_start / 60) as u32, (candidate_start % 60) as u32, 0) else {
            continue;
        };
        let Some(slot_tz) = tz.from_local_datetime(&date.and_time(time)).single() else {
            continue;
        };
        let slot_utc = slot_tz.with_timezone(&Utc);
        let slot_end_utc = slot_utc + Duration::minutes(duration_min);

        let occupied = existing_bookings.iter().any(|b| {
            b.is_occupying() && b.start_time < slot_end_utc && slot_utc < b.end_time
        });
        if occupied {
            continue;
        }

        if slot_utc < now {
            continue;
        }

        slots.push(slot_utc);
    }

    slots
}

fn minutes_of(time: NaiveTime) -> i64 {
    use chrono::Timelike;
    (time.hour() * 60 + time.minute()) as i64
}
