//! Event Store - Core in-memory event sequence
//!
//! The EventStore keeps every normalized data point in insertion order
//! and notifies subscribers synchronously after each append.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::types::{DataPoint, Payload};
use crate::utils::current_time;

/// Threshold for using a parallel scan (stored point count)
const PARALLEL_SCAN_THRESHOLD: usize = 10_000;

/// Result type for EventStore operations
pub type EventStoreResult<T> = Result<T, EventStoreError>;

/// Errors that can occur in EventStore operations
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// Reserved for payload validation rules; no rule currently rejects a payload
    #[error("Invalid event: {0}")]
    Validation(String),
}

/// Callback invoked for every data point stored after registration
pub type Subscriber = Arc<dyn Fn(&DataPoint) + Send + Sync>;

struct StoreInner {
    points: Vec<DataPoint>,
    subscribers: Vec<Subscriber>,
}

/// Append-only, thread-safe sequence of data points
///
/// One reader/writer lock guards both the sequence and the subscriber
/// list. Subscribers run on the caller's thread after the lock is released,
/// so a slow subscriber delays its own `store` call but never blocks readers.
pub struct EventStore {
    inner: RwLock<StoreInner>,
}

impl EventStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                points: Vec::new(),
                subscribers: Vec::new(),
            }),
        }
    }

    /// Normalize and append a payload, then notify subscribers in registration order
    pub fn store(&self, payload: Payload) -> EventStoreResult<DataPoint> {
        let point = DataPoint::from_payload(payload, current_time());

        let subscribers = {
            let mut inner = self.inner.write();
            inner.points.push(point.clone());
            inner.subscribers.clone()
        };

        debug!(
            event_type = %point.event_type,
            source = %point.source,
            subscribers = subscribers.len(),
            "Stored data point"
        );

        for subscriber in &subscribers {
            subscriber(&point);
        }

        Ok(point)
    }

    /// All points with a timestamp strictly after `since`, in insertion order
    pub fn get_data(&self, since: DateTime<Utc>) -> Vec<DataPoint> {
        self.scan(|point| point.timestamp > since)
    }

    /// Points of one type with a timestamp strictly after `since`, in insertion order
    pub fn get_data_by_type(&self, event_type: &str, since: DateTime<Utc>) -> Vec<DataPoint> {
        self.scan(|point| point.event_type == event_type && point.timestamp > since)
    }

    /// Register a callback for every future `store` call (no replay)
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&DataPoint) + Send + Sync + 'static,
    {
        self.inner.write().subscribers.push(Arc::new(callback));
    }

    /// Number of stored points
    pub fn len(&self) -> usize {
        self.inner.read().points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().points.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.read().subscribers.len()
    }

    fn scan<F>(&self, keep: F) -> Vec<DataPoint>
    where
        F: Fn(&DataPoint) -> bool + Sync,
    {
        let inner = self.inner.read();

        // Parallel collect preserves the original order
        if inner.points.len() >= PARALLEL_SCAN_THRESHOLD {
            inner
                .points
                .par_iter()
                .filter(|point| keep(point))
                .cloned()
                .collect()
        } else {
            inner
                .points
                .iter()
                .filter(|point| keep(point))
                .cloned()
                .collect()
        }
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}
