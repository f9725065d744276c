use crate::domain::models::{
    booking::{Booking, NewBooking},
    resource::Resource,
    selection::PendingSelection,
    service_offering::ServiceOffering,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Injected time source. The domain never reads the system clock directly so
/// past-slot checks stay testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Resource>, AppError>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<ServiceOffering>, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Occupying bookings intersecting [start, end) for one resource.
    async fn list_occupying_in_range(
        &self,
        resource_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, AppError>;

    /// Single-query slot check: first occupying booking overlapping
    /// [start, end), if any. Re-issued inside the reservation transaction.
    async fn find_conflicting(
        &self,
        resource_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Booking>, AppError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>, AppError>;

    /// The reservation transaction: lock the resource row, re-check overlap,
    /// generate a unique code, insert CONFIRMED, bump the usage counter,
    /// commit. All effects apply or none do.
    async fn reserve_slot(&self, request: &NewBooking) -> Result<Booking, AppError>;
}

/// Ephemeral per-customer pending-selection store. Async so a shared-cache
/// implementation can stand in for the in-process map.
#[async_trait]
pub trait SelectionStore: Send + Sync {
    /// Overwrites any existing selection for the key.
    async fn put(&self, key: &str, selection: PendingSelection) -> Result<(), AppError>;

    /// Returns the selection if present and within TTL; an expired entry is
    /// evicted and reported as absent.
    async fn get(&self, key: &str) -> Result<Option<PendingSelection>, AppError>;

    async fn clear(&self, key: &str) -> Result<(), AppError>;

    /// Removes all entries past TTL; returns how many were dropped.
    async fn sweep_expired(&self) -> Result<usize, AppError>;
}
