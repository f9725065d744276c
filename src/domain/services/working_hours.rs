use chrono::{NaiveTime, Weekday};
use tracing::warn;

use crate::domain::models::resource::{DayHours, Resource, WeeklyTemplate};

/// Resolved working hours for one weekday, in the resource's local wall clock.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySchedule {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub breaks: Vec<(NaiveTime, NaiveTime)>,
}

/// Outcome of the template lookup. A template that fails to parse as a whole
/// degrades to `MalformedFallbackOpen` rather than blocking booking entirely;
/// an individual day with bad times degrades to `Closed`.
#[derive(Debug, Clone, PartialEq)]
pub enum DayAvailability {
    Closed,
    Open(DaySchedule),
    MalformedFallbackOpen,
}

/// Point check used by the selection path.
#[derive(Debug, Clone, PartialEq)]
pub enum HoursVerdict {
    Inside,
    /// Template is malformed; the slot is admitted with a warning instead of
    /// failing hard.
    DegradedOpen,
    Outside(String),
}

pub fn schedule_for(resource: &Resource, weekday: Weekday) -> DayAvailability {
    let template: WeeklyTemplate = match serde_json::from_str(&resource.schedule_json) {
        Ok(t) => t,
        Err(e) => {
            warn!(
                resource_id = %resource.id,
                "Malformed availability template ({}); falling back to open",
                e
            );
            return DayAvailability::MalformedFallbackOpen;
        }
    };

    let day = match weekday {
        Weekday::Mon => &template.monday,
        Weekday::Tue => &template.tuesday,
        Weekday::Wed => &template.wednesday,
        Weekday::Thu => &template.thursday,
        Weekday::Fri => &template.friday,
        Weekday::Sat => &template.saturday,
        Weekday::Sun => &template.sunday,
    };

    match day {
        Some(hours) => parse_day(resource, hours),
        None => DayAvailability::Closed,
    }
}

fn parse_day(resource: &Resource, hours: &DayHours) -> DayAvailability {
    let (Ok(start), Ok(end)) = (
        NaiveTime::parse_from_str(&hours.start, "%H:%M"),
        NaiveTime::parse_from_str(&hours.end, "%H:%M"),
    ) else {
        warn!(resource_id = %resource.id, "Invalid day hours {:?}-{:?}; treating day as closed", hours.start, hours.end);
        return DayAvailability::Closed;
    };

    if end <= start {
        warn!(resource_id = %resource.id, "Inverted day hours; treating day as closed");
        return DayAvailability::Closed;
    }

    let mut breaks = Vec::with_capacity(hours.breaks.len());
    for b in &hours.breaks {
        let (Ok(b_start), Ok(b_end)) = (
            NaiveTime::parse_from_str(&b.start, "%H:%M"),
            NaiveTime::parse_from_str(&b.end, "%H:%M"),
        ) else {
            warn!(resource_id = %resource.id, "Invalid break {:?}-{:?}; treating day as closed", b.start, b.end);
            return DayAvailability::Closed;
        };
        if b_end > b_start {
            breaks.push((b_start, b_end));
        }
    }

    DayAvailability::Open(DaySchedule { start, end, breaks })
}

/// Does `[time, time + duration)` fit inside the day's working hours and
/// outside every break? Pure local-time arithmetic; the weekday comes from
/// the caller-supplied local calendar date.
pub fn check_slot_within_hours(
    resource: &Resource,
    weekday: Weekday,
    time: NaiveTime,
    duration_min: i64,
) -> HoursVerdict {
    let schedule = match schedule_for(resource, weekday) {
        DayAvailability::Closed => {
            return HoursVerdict::Outside("Resource is closed on that day".to_string());
        }
        DayAvailability::MalformedFallbackOpen => return HoursVerdict::DegradedOpen,
        DayAvailability::Open(s) => s,
    };

    // overflowing_add_signed wraps at midnight and reports the wrap
    let (slot_end, wrap) = time.overflowing_add_signed(chrono::Duration::minutes(duration_min));
    if wrap != 0 {
        return HoursVerdict::Outside("Slot runs past midnight".to_string());
    }

    if time < schedule.start || slot_end > schedule.end {
        return HoursVerdict::Outside("Slot is outside working hours".to_string());
    }

    for (b_start, b_end) in &schedule.breaks {
        if time < *b_end && *b_start < slot_end {
            return HoursVerdict::Outside("Slot overlaps a break".to_string());
        }
    }

    HoursVerdict::Inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn resource_with_schedule(schedule_json: &str) -> Resource {
        Resource {
            id: "r1".to_string(),
            name: "Anna".to_string(),
            active: true,
            timezone: "UTC".to_string(),
            schedule_json: schedule_json.to_string(),
            booking_count: 0,
            created_at: Utc::now(),
        }
    }

    const WEEK: &str = r#"{
        "monday": {"start": "09:00", "end": "18:00", "breaks": [{"start": "12:00", "end": "13:00"}]}
    }"#;

    #[test]
    fn missing_day_is_closed() {
        let resource = resource_with_schedule(WEEK);
        assert_eq!(schedule_for(&resource, Weekday::Sun), DayAvailability::Closed);
    }

    #[test]
    fn valid_day_resolves_hours_and_breaks() {
        let resource = resource_with_schedule(WEEK);
        let DayAvailability::Open(schedule) = schedule_for(&resource, Weekday::Mon) else {
            panic!("expected open day");
        };
        assert_eq!(schedule.start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(schedule.end, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(schedule.breaks.len(), 1);
    }

    #[test]
    fn malformed_template_falls_back_open() {
        let resource = resource_with_schedule("{ not json");
        assert_eq!(
            schedule_for(&resource, Weekday::Mon),
            DayAvailability::MalformedFallbackOpen
        );
        assert_eq!(
            check_slot_within_hours(
                &resource,
                Weekday::Mon,
                NaiveTime::from_hms_opt(3, 0, 0).unwrap(),
                60
            ),
            HoursVerdict::DegradedOpen
        );
    }

    #[test]
    fn invalid_day_times_degrade_to_closed() {
        let resource = resource_with_schedule(r#"{"monday": {"start": "9am", "end": "18:00"}}"#);
        assert_eq!(schedule_for(&resource, Weekday::Mon), DayAvailability::Closed);

        let inverted = resource_with_schedule(r#"{"monday": {"start": "18:00", "end": "09:00"}}"#);
        assert_eq!(schedule_for(&inverted, Weekday::Mon), DayAvailability::Closed);
    }

    #[test]
    fn slot_inside_hours_passes() {
        let resource = resource_with_schedule(WEEK);
        assert_eq!(
            check_slot_within_hours(&resource, Weekday::Mon, NaiveTime::from_hms_opt(9, 0, 0).unwrap(), 60),
            HoursVerdict::Inside
        );
    }

    #[test]
    fn slot_past_closing_is_rejected_even_if_start_fits() {
        let resource = resource_with_schedule(WEEK);
        let verdict = check_slot_within_hours(
            &resource,
            Weekday::Mon,
            NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
            60,
        );
        assert!(matches!(verdict, HoursVerdict::Outside(_)));
    }

    #[test]
    fn partial_break_overlap_is_rejected() {
        let resource = resource_with_schedule(WEEK);
        // 11:30 + 60min runs into the 12:00-13:00 break
        let verdict = check_slot_within_hours(
            &resource,
            Weekday::Mon,
            NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
            60,
        );
        assert!(matches!(verdict, HoursVerdict::Outside(_)));

        // 11:00 + 60min ends exactly at the break start: allowed
        assert_eq!(
            check_slot_within_hours(&resource, Weekday::Mon, NaiveTime::from_hms_opt(11, 0, 0).unwrap(), 60),
            HoursVerdict::Inside
        );
    }
}
