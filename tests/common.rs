use reservation_engine::{
    api::router::create_router,
    config::Config,
    domain::ports::Clock,
    domain::services::reservation::{ReservationService, RetryPolicy},
    infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo, sqlite_resource_repo::SqliteResourceRepo,
        sqlite_service_repo::SqliteServiceRepo,
    },
    infra::session::memory::MemorySelectionStore,
    state::AppState,
};

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

/// Real time plus a controllable offset, so TTL and past-slot behavior can be
/// driven without sleeping.
pub struct TestClock {
    offset_secs: AtomicI64,
}

impl TestClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { offset_secs: AtomicI64::new(0) })
    }

    pub fn advance(&self, by: Duration) {
        self.offset_secs.fetch_add(by.num_seconds(), Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.offset_secs.load(Ordering::SeqCst))
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub clock: Arc<TestClock>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            session_ttl_minutes: 15,
            sweep_interval_secs: 300,
            slot_granularity_min: 15,
        };

        let clock = TestClock::new();
        let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));
        let selection_store = Arc::new(MemorySelectionStore::new(
            clock.clone(),
            Duration::minutes(config.session_ttl_minutes),
        ));
        let reservation = Arc::new(ReservationService::with_retry(
            booking_repo.clone(),
            clock.clone(),
            RetryPolicy {
                max_attempts: 3,
                base_delay: std::time::Duration::ZERO,
            },
        ));

        let state = Arc::new(AppState {
            config,
            resource_repo: Arc::new(SqliteResourceRepo::new(pool.clone())),
            service_repo: Arc::new(SqliteServiceRepo::new(pool.clone())),
            booking_repo,
            selection_store,
            reservation,
            clock: clock.clone(),
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            clock,
        }
    }

    pub async fn seed_resource(&self, id: &str, timezone: &str, schedule_json: &str) {
        sqlx::query(
            "INSERT INTO resources (id, name, active, timezone, schedule_json, booking_count, created_at) VALUES (?, ?, TRUE, ?, ?, 0, ?)",
        )
        .bind(id)
        .bind(format!("Resource {}", id))
        .bind(timezone)
        .bind(schedule_json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .expect("Failed to seed resource");
    }

    pub async fn deactivate_resource(&self, id: &str) {
        sqlx::query("UPDATE resources SET active = FALSE WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .expect("Failed to deactivate resource");
    }

    pub async fn seed_service(&self, id: &str, duration_min: i32, price: i64) {
        sqlx::query(
            "INSERT INTO services (id, name, duration_min, price, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(format!("Service {}", id))
        .bind(duration_min)
        .bind(price)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .expect("Failed to seed service");
    }

    pub async fn insert_booking(
        &self,
        resource_id: &str,
        code: &str,
        start: DateTime<Utc>,
        minutes: i64,
        status: &str,
    ) {
        sqlx::query(
            "INSERT INTO bookings (id, resource_id, service_id, customer_id, code, start_time, end_time, status, price, created_at) \
             VALUES (?, ?, 'svc', 'seed-customer', ?, ?, ?, ?, 0, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(resource_id)
        .bind(code)
        .bind(start)
        .bind(start + Duration::minutes(minutes))
        .bind(status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .expect("Failed to seed booking");
    }

    pub async fn get_slots(&self, resource_id: &str, date: &str, service_id: &str) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!(
                        "/api/v1/resources/{}/slots?date={}&service_id={}",
                        resource_id, date, service_id
                    ))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn select(
        &self,
        resource_id: &str,
        customer_id: &str,
        service_id: &str,
        date: &str,
        time: &str,
    ) -> axum::response::Response {
        let payload = serde_json::json!({
            "customer_id": customer_id,
            "service_id": service_id,
            "date": date,
            "time": time
        });
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/resources/{}/select", resource_id))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn confirm(&self, resource_id: &str, customer_id: &str) -> axum::response::Response {
        let payload = serde_json::json!({ "customer_id": customer_id });
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/resources/{}/confirm", resource_id))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

#[allow(dead_code)]
pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// First Monday at least two days out, so nothing collides with "today".
#[allow(dead_code)]
pub fn next_monday() -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(2);
    while date.weekday() != chrono::Weekday::Mon {
        date += Duration::days(1);
    }
    date
}

#[allow(dead_code)]
pub const NINE_TO_SIX: &str = r#"{
    "monday": {"start": "09:00", "end": "18:00"},
    "tuesday": {"start": "09:00", "end": "18:00"},
    "wednesday": {"start": "09:00", "end": "18:00"},
    "thursday": {"start": "09:00", "end": "18:00"},
    "friday": {"start": "09:00", "end": "18:00"}
}"#;
