use serde::Deserialize;

#[derive(Deserialize)]
pub struct SelectSlotRequest {
    pub customer_id: String,
    pub service_id: String,
    /// Local calendar date of the resource, YYYY-MM-DD.
    pub date: String,
    /// Local wall-clock time HH:MM, or a full RFC3339 timestamp.
    pub time: String,
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub customer_id: String,
}
