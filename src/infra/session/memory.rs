use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use dashmap::DashMap;
use tracing::debug;

use crate::domain::models::selection::PendingSelection;
use crate::domain::ports::{Clock, SelectionStore};
use crate::error::AppError;

/// In-process pending-selection store. Valid for single-instance deployments
/// and tests; multi-instance deployments swap in a shared TTL-native cache
/// behind the same trait.
pub struct MemorySelectionStore {
    entries: DashMap<String, PendingSelection>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl MemorySelectionStore {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            ttl,
        }
    }

    fn is_expired(&self, selection: &PendingSelection) -> bool {
        self.clock.now() - selection.created_at > self.ttl
    }
}

#[async_trait]
impl SelectionStore for MemorySelectionStore {
    async fn put(&self, key: &str, selection: PendingSelection) -> Result<(), AppError> {
        debug!(key, "Storing pending selection");
        self.entries.insert(key.to_string(), selection);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<PendingSelection>, AppError> {
        let Some(entry) = self.entries.get(key) else {
            return Ok(None);
        };

        if self.is_expired(&entry) {
            drop(entry);
            self.entries.remove(key);
            debug!(key, "Evicted expired pending selection on read");
            return Ok(None);
        }

        Ok(Some(entry.clone()))
    }

    async fn clear(&self, key: &str) -> Result<(), AppError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn sweep_expired(&self) -> Result<usize, AppError> {
        let before = self.entries.len();
        self.entries.retain(|_, selection| !self.is_expired(selection));
        Ok(before - self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
    use std::sync::Mutex;

    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn starting_at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self { now: Mutex::new(now) })
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    fn selection_at(created_at: DateTime<Utc>) -> PendingSelection {
        PendingSelection {
            resource_id: "r1".to_string(),
            service_id: "s1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            created_at,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn put_get_roundtrip_and_overwrite() {
        let clock = ManualClock::starting_at(t0());
        let store = MemorySelectionStore::new(clock, Duration::minutes(15));

        store.put("c1:r1", selection_at(t0())).await.unwrap();
        let got = store.get("c1:r1").await.unwrap().unwrap();
        assert_eq!(got.time, NaiveTime::from_hms_opt(15, 0, 0).unwrap());

        let mut second = selection_at(t0());
        second.time = NaiveTime::from_hms_opt(16, 0, 0).unwrap();
        store.put("c1:r1", second).await.unwrap();
        let got = store.get("c1:r1").await.unwrap().unwrap();
        assert_eq!(got.time, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn entry_usable_before_ttl_and_evicted_after() {
        let clock = ManualClock::starting_at(t0());
        let store = MemorySelectionStore::new(clock.clone(), Duration::minutes(15));
        store.put("c1:r1", selection_at(t0())).await.unwrap();

        clock.advance(Duration::minutes(14));
        assert!(store.get("c1:r1").await.unwrap().is_some());

        clock.advance(Duration::minutes(2));
        assert!(store.get("c1:r1").await.unwrap().is_none());
        // Evicted, not just hidden
        assert!(store.entries.is_empty());
    }

    #[tokio::test]
    async fn clear_removes_entry() {
        let clock = ManualClock::starting_at(t0());
        let store = MemorySelectionStore::new(clock, Duration::minutes(15));
        store.put("c1:r1", selection_at(t0())).await.unwrap();
        store.clear("c1:r1").await.unwrap();
        assert!(store.get("c1:r1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_entries() {
        let clock = ManualClock::starting_at(t0());
        let store = MemorySelectionStore::new(clock.clone(), Duration::minutes(15));

        store.put("old:r1", selection_at(t0())).await.unwrap();
        clock.advance(Duration::minutes(10));
        store.put("fresh:r1", selection_at(clock.now())).await.unwrap();
        clock.advance(Duration::minutes(10));

        let swept = store.sweep_expired().await.unwrap();
        assert_eq!(swept, 1);
        assert!(store.get("old:r1").await.unwrap().is_none());
        assert!(store.get("fresh:r1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn keys_do_not_interfere() {
        let clock = ManualClock::starting_at(t0());
        let store = MemorySelectionStore::new(clock, Duration::minutes(15));
        store.put("a:r1", selection_at(t0())).await.unwrap();
        store.put("b:r1", selection_at(t0())).await.unwrap();
        store.clear("a:r1").await.unwrap();
        assert!(store.get("b:r1").await.unwrap().is_some());
    }
}
