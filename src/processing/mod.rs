//! Metrics processing
//!
//! - `MetricsAggregator`: incremental and periodic metrics updates
//! - `ListenerRegistry` / `NotificationDispatcher`: asynchronous snapshot fan-out

mod aggregator;
mod listeners;

pub use aggregator::{AggregatorConfig, AggregatorError, AggregatorResult, MetricsAggregator};
pub use listeners::{Listener, ListenerRegistry, NotificationDispatcher};
