use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info};

use crate::state::AppState;

/// Periodically drops expired pending selections so the store stays bounded
/// even for customers who never return.
pub async fn start_selection_sweeper(state: Arc<AppState>) {
    info!(
        interval_secs = state.config.sweep_interval_secs,
        "Starting pending-selection sweeper"
    );

    loop {
        sleep(Duration::from_secs(state.config.sweep_interval_secs)).await;

        match state.selection_store.sweep_expired().await {
            Ok(0) => {}
            Ok(count) => info!("Swept {} expired pending selections", count),
            Err(e) => error!("Selection sweep failed: {:?}", e),
        }
    }
}
