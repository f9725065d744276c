use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Lifetime of a pending selection.
    pub session_ttl_minutes: i64,
    /// Interval of the background sweep over expired selections.
    pub sweep_interval_secs: u64,
    /// Step between candidate slot start-times.
    pub slot_granularity_min: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            session_ttl_minutes: env::var("SESSION_TTL_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .expect("SESSION_TTL_MINUTES must be a number"),
            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .expect("SWEEP_INTERVAL_SECS must be a number"),
            slot_granularity_min: env::var("SLOT_GRANULARITY_MIN")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .expect("SLOT_GRANULARITY_MIN must be a number"),
        }
    }
}
