use serde::Serialize;

#[derive(Serialize)]
pub struct SlotsResponse {
    pub date: String,
    pub slots: Vec<String>,
}

#[derive(Serialize)]
pub struct SelectionAck {
    pub status: String,
    pub resource_id: String,
    pub start: String,
    pub expires_at: String,
}

#[derive(Serialize)]
pub struct ConflictResponse {
    pub error: String,
    pub conflicting_booking: String,
    pub alternatives: Vec<String>,
}
