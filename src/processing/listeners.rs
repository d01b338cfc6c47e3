//! Metrics listeners and the task that notifies them
//!
//! Inside a runtime, updates never call listeners directly. Each update pushes
//! its snapshot onto a channel, and a dedicated dispatcher task drains it,
//! calling every listener in registration order. A panicking listener is
//! logged and skipped.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::types::Metrics;

/// Callback receiving a metrics snapshot after every update
pub type Listener = Arc<dyn Fn(&Metrics) + Send + Sync>;

/// Shared, append-only list of listeners
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: Arc<RwLock<Vec<Listener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Listener) {
        self.listeners.write().push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Call every listener with `snapshot`, returning how many panicked
    pub fn notify(&self, snapshot: &Metrics) -> usize {
        // Listeners may register more listeners, so never call them under the lock
        let listeners = self.listeners.read().clone();

        let mut failed = 0;
        for (index, listener) in listeners.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| listener(snapshot))).is_err() {
                warn!(listener = index, "Metrics listener panicked");
                failed += 1;
            }
        }
        failed
    }
}

/// Drains queued snapshots and hands them to the registered listeners
pub struct NotificationDispatcher {
    rx: mpsc::UnboundedReceiver<Metrics>,
    listeners: ListenerRegistry,
}

impl NotificationDispatcher {
    pub fn new(rx: mpsc::UnboundedReceiver<Metrics>, listeners: ListenerRegistry) -> Self {
        Self { rx, listeners }
    }

    /// Run until `shutdown` is cancelled or every sender is gone, draining
    /// whatever is still queued on cancellation
    pub async fn run(mut self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    // Updates that completed before stop are still delivered
                    while let Ok(snapshot) = self.rx.try_recv() {
                        self.listeners.notify(&snapshot);
                    }
                    break;
                }

                snapshot = self.rx.recv() => {
                    match snapshot {
                        Some(snapshot) => {
                            self.listeners.notify(&snapshot);
                        }
                        None => break,
                    }
                }
            }
        }
        debug!("Notification dispatcher stopped");
    }
}
