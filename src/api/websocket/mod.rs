//! WebSocket module for real-time dashboard updates
//!
//! Provides the WebSocket endpoint at `/api/ws`. A connecting client first
//! receives the current metrics snapshot, then every snapshot the
//! aggregator publishes.

pub mod handler;
pub mod state;

pub use state::AppState;
