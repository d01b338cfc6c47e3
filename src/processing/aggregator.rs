//! Metrics Aggregator - derives aggregate metrics from the event store
//!
//! Two independent paths update the same `Metrics`:
//! - the incremental path runs inside every `EventStore::store` call
//!   (the aggregator is a store subscriber) and folds in one point;
//! - the periodic path runs on a timer, rescans the last `window` of the
//!   store and *replaces* `total_events` / `events_by_type` with the
//!   window counts.
//!
//! The two paths define the counters differently, so `total_events` drops
//! back to the window count on every refresh and climbs again with each
//! stored event until the next one.
//!
//! Listener notification does not depend on `start`. The dispatcher task is
//! spawned on the first update that happens inside a Tokio runtime; updates
//! made with no runtime at all notify listeners on the calling thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::listeners::{ListenerRegistry, NotificationDispatcher};
use crate::event_store::EventStore;
use crate::types::{DataPoint, Metrics, DEFAULT_SERIES_CAPACITY};
use crate::utils::{current_time, window_start};

/// Configuration for the MetricsAggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Time between periodic window refreshes
    pub refresh_interval: Duration,
    /// Length of the sliding window rescanned on each refresh
    pub window: Duration,
    /// Maximum points kept per type in the time series
    pub series_capacity: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(10),
            window: Duration::from_secs(60 * 60),
            series_capacity: DEFAULT_SERIES_CAPACITY,
        }
    }
}

/// Result type for aggregator operations
pub type AggregatorResult<T> = Result<T, AggregatorError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("Aggregator already started")]
    AlreadyStarted,
    #[error("Refresh interval must be greater than zero")]
    ZeroRefreshInterval,
    #[error("Aggregator must be started inside a Tokio runtime")]
    NoRuntime,
}

/// Lifecycle of the notification dispatcher task
enum DispatcherSlot {
    /// Not spawned yet; owns the receiving end of the queue
    Pending(mpsc::UnboundedReceiver<Metrics>),
    Running(JoinHandle<()>),
    /// Handle taken by the refresh task for joining
    Joined,
}

/// Maintains aggregate metrics and pushes snapshots to listeners
pub struct MetricsAggregator {
    store: Arc<EventStore>,
    config: AggregatorConfig,
    metrics: RwLock<Metrics>,
    listeners: ListenerRegistry,
    notify_tx: mpsc::UnboundedSender<Metrics>,
    dispatcher: Mutex<DispatcherSlot>,
    started: AtomicBool,
    shutdown: CancellationToken,
}

impl MetricsAggregator {
    /// Create an aggregator with default config and subscribe it to `store`
    pub fn new(store: Arc<EventStore>) -> Arc<Self> {
        Self::with_config(store, AggregatorConfig::default())
    }

    /// Create an aggregator with custom config and subscribe it to `store`
    pub fn with_config(store: Arc<EventStore>, config: AggregatorConfig) -> Arc<Self> {
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();

        let aggregator = Arc::new(Self {
            store: Arc::clone(&store),
            config,
            metrics: RwLock::new(Metrics::new()),
            listeners: ListenerRegistry::new(),
            notify_tx,
            dispatcher: Mutex::new(DispatcherSlot::Pending(notify_rx)),
            started: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        });

        // Weak, so the store's subscriber list does not keep the aggregator alive
        let weak: Weak<Self> = Arc::downgrade(&aggregator);
        store.subscribe(move |point: &DataPoint| {
            if let Some(aggregator) = weak.upgrade() {
                aggregator.process_data_point(point);
            }
        });

        aggregator
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Independent deep copy of the current metrics
    pub fn get_metrics(&self) -> Metrics {
        self.metrics.read().clone()
    }

    /// Register a callback invoked with a snapshot after every update
    pub fn add_listener<F>(&self, listener: F)
    where
        F: Fn(&Metrics) + Send + Sync + 'static,
    {
        self.listeners.add(Arc::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Incremental update for one freshly stored point
    pub fn process_data_point(&self, point: &DataPoint) {
        let snapshot = {
            let mut metrics = self.metrics.write();
            metrics.record(point, self.config.series_capacity);
            self.wants_snapshot().then(|| metrics.clone())
        };

        if let Some(snapshot) = snapshot {
            self.dispatch(snapshot);
        }
    }

    /// Periodic update: recount the last `window` of the store
    ///
    /// Replaces `total_events` and `events_by_type`; recent values and
    /// time series are left as the incremental path built them.
    pub fn refresh_window(&self) {
        let since = window_start(current_time(), self.config.window);
        let recent = self.store.get_data(since);

        let snapshot = {
            let mut metrics = self.metrics.write();
            metrics.replace_counts(&recent);
            self.wants_snapshot().then(|| metrics.clone())
        };

        debug!(
            window_events = recent.len(),
            since = %since,
            "Refreshed metrics window"
        );

        if let Some(snapshot) = snapshot {
            self.dispatch(snapshot);
        }
    }

    /// Spawn the periodic refresh loop
    ///
    /// Must be called inside a Tokio runtime. The returned handle completes
    /// after `stop`, once every snapshot queued before it was delivered.
    pub fn start(self: &Arc<Self>) -> AggregatorResult<JoinHandle<()>> {
        if self.config.refresh_interval.is_zero() {
            return Err(AggregatorError::ZeroRefreshInterval);
        }
        let runtime = Handle::try_current().map_err(|_| AggregatorError::NoRuntime)?;
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(AggregatorError::AlreadyStarted);
        }

        // Spawned here too so the returned handle can join it
        self.ensure_dispatcher(&runtime);

        let aggregator = Arc::clone(self);
        Ok(runtime.spawn(async move {
            aggregator.run_refresh_loop().await;
            aggregator.join_dispatcher().await;
        }))
    }

    /// Signal the refresh loop and dispatcher to exit; safe to call repeatedly
    pub fn stop(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Stopping metrics aggregator");
        }
        self.shutdown.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    async fn run_refresh_loop(&self) {
        let period = self.config.refresh_interval;
        info!(
            interval_ms = period.as_millis() as u64,
            window_secs = self.config.window.as_secs(),
            "Starting metrics refresh loop"
        );

        // First refresh happens one full period after start
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => self.refresh_window(),
            }
        }

        info!("Metrics refresh loop stopped");
    }

    /// Snapshots are only worth copying when someone will receive them
    fn wants_snapshot(&self) -> bool {
        !self.listeners.is_empty() && !self.shutdown.is_cancelled()
    }

    fn dispatch(&self, snapshot: Metrics) {
        let queued = match Handle::try_current() {
            Ok(runtime) => {
                self.ensure_dispatcher(&runtime);
                true
            }
            Err(_) => !matches!(*self.dispatcher.lock(), DispatcherSlot::Pending(_)),
        };

        if queued {
            // Fails only once the dispatcher is gone, i.e. after stop
            let _ = self.notify_tx.send(snapshot);
        } else {
            // No runtime to host the dispatcher
            self.listeners.notify(&snapshot);
        }
    }

    fn ensure_dispatcher(&self, runtime: &Handle) {
        let mut slot = self.dispatcher.lock();
        if !matches!(*slot, DispatcherSlot::Pending(_)) {
            return;
        }
        if let DispatcherSlot::Pending(rx) = std::mem::replace(&mut *slot, DispatcherSlot::Joined) {
            let dispatcher = NotificationDispatcher::new(rx, self.listeners.clone());
            *slot = DispatcherSlot::Running(runtime.spawn(dispatcher.run(self.shutdown.clone())));
            debug!("Spawned notification dispatcher");
        }
    }

    async fn join_dispatcher(&self) {
        let previous = std::mem::replace(&mut *self.dispatcher.lock(), DispatcherSlot::Joined);
        match previous {
            DispatcherSlot::Running(handle) => {
                let _ = handle.await;
            }
            other => *self.dispatcher.lock() = other,
        }
    }
}
