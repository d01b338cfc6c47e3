//! Utility functions and helpers
//!
//! This module contains timestamp utilities shared by the store and aggregator.

pub mod time;

pub use time::{current_time, minutes_before, window_start};
