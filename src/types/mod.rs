//! Data types for the analytics core
//!
//! This module contains the payloads producers send, the normalized data
//! points the store keeps, and the aggregate metrics derived from them.

mod metrics;
mod payload;
mod value;

pub use metrics::{recent_key, Metrics, TimeSeriesPoint, DEFAULT_SERIES_CAPACITY};
pub use payload::{is_zero_instant, DataPoint, Payload};
pub use value::{Value, Values};
