use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// A chosen-but-unconfirmed slot, held per customer until confirmation,
/// cancellation, or TTL expiry. Never the system of record.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PendingSelection {
    pub resource_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

/// One selection may exist per customer and resource at a time.
pub fn session_key(customer_id: &str, resource_id: &str) -> String {
    format!("{}:{}", customer_id, resource_id)
}
