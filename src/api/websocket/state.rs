//! Shared application state for HTTP and WebSocket handlers

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::event_store::EventStore;
use crate::processing::MetricsAggregator;
use crate::types::Metrics;

/// Handles to the analytics core plus the snapshot broadcast channel
pub struct AppState {
    pub store: Arc<EventStore>,
    pub aggregator: Arc<MetricsAggregator>,
    /// Every aggregator snapshot is re-published here for WebSocket clients
    pub metrics_tx: broadcast::Sender<Metrics>,
}

impl AppState {
    /// Create the state and register the broadcast channel as an aggregator listener
    pub fn new(
        store: Arc<EventStore>,
        aggregator: Arc<MetricsAggregator>,
        broadcast_capacity: usize,
    ) -> Self {
        // If clients are too slow, they'll miss snapshots and get a lag notice
        let (metrics_tx, _) = broadcast::channel(broadcast_capacity);

        let tx = metrics_tx.clone();
        aggregator.add_listener(move |metrics: &Metrics| {
            // Ignore send errors - they just mean no clients are connected
            let _ = tx.send(metrics.clone());
        });

        Self {
            store,
            aggregator,
            metrics_tx,
        }
    }

    /// Subscribe to receive every future metrics snapshot
    pub fn subscribe(&self) -> broadcast::Receiver<Metrics> {
        self.metrics_tx.subscribe()
    }

    pub fn connected_clients(&self) -> usize {
        self.metrics_tx.receiver_count()
    }
}
