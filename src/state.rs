use std::sync::Arc;

use crate::config::Config;
use crate::domain::ports::{
    BookingRepository, Clock, ResourceRepository, SelectionStore, ServiceRepository,
};
use crate::domain::services::reservation::ReservationService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub resource_repo: Arc<dyn ResourceRepository>,
    pub service_repo: Arc<dyn ServiceRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub selection_store: Arc<dyn SelectionStore>,
    pub reservation: Arc<ReservationService>,
    pub clock: Arc<dyn Clock>,
}
