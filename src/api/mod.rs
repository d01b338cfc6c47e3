//! API module for HTTP and WebSocket endpoints
//!
//! A thin transport over the analytics core: ingestion, metrics and data
//! queries over REST, plus real-time metrics snapshots over WebSocket.

pub mod http;
pub mod rest;
pub mod websocket;

pub use http::{create_router, serve};
pub use websocket::AppState;
