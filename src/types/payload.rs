//! Ingested payloads and the normalized data points they become
//!
//! A `Payload` is what producers send. The store turns it into a
//! `DataPoint`, whose timestamp is always present. Data points are
//! immutable once stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::value::{Value, Values};

/// Unix seconds of `0001-01-01T00:00:00Z`, the zero time Go-style producers send
const GO_ZERO_UNIX_SECS: i64 = -62_135_596_800;

/// Raw event as received from a producer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub values: Values,
}

impl Payload {
    /// Create a payload without a timestamp (the store assigns one)
    pub fn new(event_type: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            source: source.into(),
            event_type: event_type.into(),
            values: Values::new(),
        }
    }

    /// Set an explicit event timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Add a value field
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

/// A stored event with a guaranteed timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub values: Values,
}

impl DataPoint {
    /// Normalize a payload, assigning `now` when the timestamp is absent or zero
    pub fn from_payload(payload: Payload, now: DateTime<Utc>) -> Self {
        let timestamp = match payload.timestamp {
            Some(ts) if !is_zero_instant(&ts) => ts,
            _ => now,
        };

        Self {
            timestamp,
            source: payload.source,
            event_type: payload.event_type,
            values: payload.values,
        }
    }
}

/// True for the Unix epoch and for Go's zero time
pub fn is_zero_instant(ts: &DateTime<Utc>) -> bool {
    ts.timestamp_subsec_nanos() == 0
        && (ts.timestamp() == 0 || ts.timestamp() == GO_ZERO_UNIX_SECS)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Values, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Values>::deserialize(deserializer)?.unwrap_or_default())
}
