use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BreakWindow {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DayHours {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub breaks: Vec<BreakWindow>,
}

/// Weekly availability template, stored as JSON on the resource row.
/// A missing weekday means the resource is closed that day.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct WeeklyTemplate {
    pub monday: Option<DayHours>,
    pub tuesday: Option<DayHours>,
    pub wednesday: Option<DayHours>,
    pub thursday: Option<DayHours>,
    pub friday: Option<DayHours>,
    pub saturday: Option<DayHours>,
    pub sunday: Option<DayHours>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub timezone: String,
    pub schedule_json: String,
    pub booking_count: i64,
    pub created_at: DateTime<Utc>,
}
