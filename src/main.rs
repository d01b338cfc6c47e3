//! Realtime Analytics Server - Binary Entry Point
//!
//! Wires the event store, metrics aggregator and HTTP/WebSocket transport,
//! then serves until Ctrl+C.

use std::error::Error;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use realtime_analytics::api::{self, AppState};
use realtime_analytics::config::{AnalyticsConfig, LogFormat};
use realtime_analytics::{EventStore, MetricsAggregator};

type AppResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Logging comes first so config warnings are visible
    init_logging(LogFormat::from_env());

    let config = AnalyticsConfig::from_env();

    info!(
        version = realtime_analytics::VERSION,
        bind = %config.bind,
        "Starting analytics server"
    );

    let store = Arc::new(EventStore::new());
    let aggregator = MetricsAggregator::with_config(store.clone(), config.aggregator.clone());
    info!(
        refresh_secs = aggregator.config().refresh_interval.as_secs(),
        window_secs = aggregator.config().window.as_secs(),
        series_capacity = aggregator.config().series_capacity,
        "Metrics aggregator configured"
    );
    let state = Arc::new(AppState::new(
        store.clone(),
        aggregator.clone(),
        config.broadcast_capacity,
    ));

    if config.mock_events > 0 {
        store.generate_mock_data(config.mock_events)?;
    }

    let aggregator_handle = aggregator.start()?;

    api::serve(config.bind, state, shutdown_signal()).await?;

    aggregator.stop();
    aggregator_handle.await?;
    info!("Server exited properly");

    Ok(())
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        // Without a signal handler, serve until the process is killed
        std::future::pending::<()>().await;
    }
    info!("Shutting down server...");
}
