use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ServiceOffering {
    pub id: String,
    pub name: String,
    pub duration_min: i32,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}
