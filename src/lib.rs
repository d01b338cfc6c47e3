//! Realtime Analytics
//!
//! An in-memory event store and metrics aggregation engine that ingests
//! loosely-typed events and keeps aggregate metrics continuously up to date.
//!
//! # Features
//!
//! - **Thread-Safe Store**: append-only event log behind a reader/writer lock
//! - **Incremental Metrics**: every stored event updates counters, last values
//!   and a bounded per-type time series
//! - **Sliding Window Refresh**: a timer recounts the last hour of events
//! - **Push Notifications**: listeners receive a snapshot after every update
//!
//! # Modules
//!
//! - `types`: Core data structures (Payload, DataPoint, Value, Metrics)
//! - `event_store`: Append-only event store with subscriptions
//! - `processing`: Metrics aggregator and listener dispatch
//! - `api`: HTTP and WebSocket transport
//! - `config`: Environment-driven configuration
//! - `utils`: Utility functions (timestamps, etc.)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use realtime_analytics::{EventStore, MetricsAggregator, Payload};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(EventStore::new());
//!     let aggregator = MetricsAggregator::new(store.clone());
//!     aggregator.add_listener(|metrics| println!("total: {}", metrics.total_events));
//!     let handle = aggregator.start().unwrap();
//!
//!     store
//!         .store(Payload::new("sales", "web").with_value("amount", 100))
//!         .unwrap();
//!
//!     aggregator.stop();
//!     handle.await.unwrap();
//! }
//! ```

pub mod api;
pub mod config;
pub mod event_store;
pub mod processing;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::AnalyticsConfig;
pub use event_store::{EventStore, EventStoreError, EventStoreResult};
pub use processing::{AggregatorConfig, AggregatorError, MetricsAggregator};
pub use types::{DataPoint, Metrics, Payload, TimeSeriesPoint, Value, Values};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
