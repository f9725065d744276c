use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, PgPool, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::ports::{Clock, SystemClock};
use crate::domain::services::reservation::ReservationService;
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_resource_repo::PostgresResourceRepo,
    postgres_service_repo::PostgresServiceRepo, sqlite_booking_repo::SqliteBookingRepo,
    sqlite_resource_repo::SqliteResourceRepo, sqlite_service_repo::SqliteServiceRepo,
};
use crate::infra::session::memory::MemorySelectionStore;
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ttl = chrono::Duration::minutes(config.session_ttl_minutes);
    let selection_store = Arc::new(MemorySelectionStore::new(clock.clone(), ttl));

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let booking_repo = Arc::new(PostgresBookingRepo::new(pool.clone()));
        let reservation = Arc::new(ReservationService::new(booking_repo.clone(), clock.clone()));

        AppState {
            config: config.clone(),
            resource_repo: Arc::new(PostgresResourceRepo::new(pool.clone())),
            service_repo: Arc::new(PostgresServiceRepo::new(pool.clone())),
            booking_repo,
            selection_store,
            reservation,
            clock,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));
        let reservation = Arc::new(ReservationService::new(booking_repo.clone(), clock.clone()));

        AppState {
            config: config.clone(),
            resource_repo: Arc::new(SqliteResourceRepo::new(pool.clone())),
            service_repo: Arc::new(SqliteServiceRepo::new(pool.clone())),
            booking_repo,
            selection_store,
            reservation,
            clock,
        }
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
