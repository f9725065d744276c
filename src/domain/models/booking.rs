use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::Rng;

pub const CODE_PREFIX: &str = "APT-";

/// Statuses that block a time interval. CANCELLED and COMPLETED bookings
/// free their slot.
pub const OCCUPYING_STATUSES: [&str; 3] = ["CONFIRMED", "PENDING", "IN_PROGRESS"];

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub resource_id: String,
    pub service_id: String,
    pub customer_id: String,
    pub code: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

/// Reservation request handed to the transactional write path. The code is
/// generated inside the transaction, not here.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub resource_id: String,
    pub service_id: String,
    pub customer_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price: i64,
}

impl Booking {
    pub fn from_request(request: &NewBooking, code: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            resource_id: request.resource_id.clone(),
            service_id: request.service_id.clone(),
            customer_id: request.customer_id.clone(),
            code,
            start_time: request.start_time,
            end_time: request.end_time,
            status: "CONFIRMED".to_string(),
            price: request.price,
            created_at: Utc::now(),
        }
    }

    pub fn is_occupying(&self) -> bool {
        OCCUPYING_STATUSES.contains(&self.status.as_str())
    }
}

/// Samples one booking-code candidate: constant prefix plus a fixed-width
/// random numeric suffix. Uniqueness is established by the caller against the
/// store, never assumed from the sample.
pub fn generate_code() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..100_000_000);
    format!("{}{:08}", CODE_PREFIX, suffix)
}
