//! Event Store Module
//!
//! This module provides the in-memory event sequence the aggregator reads:
//! - `EventStore`: append-only log with range queries and subscriptions
//! - mock data seeding for demos
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌──────────┐    ┌──────────────────┐    ┌──────────────────────┐
//! │ Producer │───►│ append under     │───►│ notify subscribers   │
//! │ store()  │    │ write lock       │    │ (outside the lock)   │
//! └──────────┘    └──────────────────┘    └──────────────────────┘
//!
//! Read Path:
//! ┌──────────────┐    ┌──────────────────────────┐
//! │ get_data()   │───►│ filter ts > since under  │───► owned copies
//! │ by_type()    │    │ shared read lock         │
//! └──────────────┘    └──────────────────────────┘
//! ```

mod mock;
mod store;

pub use store::{EventStore, EventStoreError, EventStoreResult, Subscriber};
