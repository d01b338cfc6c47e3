//! Aggregate metrics derived from stored data points

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payload::DataPoint;
use super::value::{Value, Values};

/// Default number of points kept per type in `time_series_data`
pub const DEFAULT_SERIES_CAPACITY: usize = 100;

/// A single point in a per-type time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub values: Values,
}

/// Aggregate snapshot over the event stream
///
/// All fields are owned, so `clone()` yields a fully independent copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_events: u64,
    pub events_by_type: BTreeMap<String, u64>,
    /// `"<type>.<key>"` -> last value seen for that key, in arrival order
    pub recent_values: BTreeMap<String, Value>,
    pub time_series_data: BTreeMap<String, VecDeque<TimeSeriesPoint>>,
}

impl Metrics {
    /// Create an empty metrics set
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one freshly stored point into the counters, recent values and series
    ///
    /// Series hold at most `series_capacity` points; the oldest is evicted first.
    pub fn record(&mut self, point: &DataPoint, series_capacity: usize) {
        self.total_events += 1;
        *self
            .events_by_type
            .entry(point.event_type.clone())
            .or_insert(0) += 1;

        for (key, value) in &point.values {
            self.recent_values
                .insert(recent_key(&point.event_type, key), value.clone());
        }

        let series = self
            .time_series_data
            .entry(point.event_type.clone())
            .or_default();
        series.push_back(TimeSeriesPoint {
            timestamp: point.timestamp,
            values: point.values.clone(),
        });
        while series.len() > series_capacity {
            series.pop_front();
        }
    }

    /// Replace the counters with a recount over `window`
    ///
    /// `recent_values` and `time_series_data` are left untouched.
    pub fn replace_counts(&mut self, window: &[DataPoint]) {
        let mut by_type = BTreeMap::new();
        for point in window {
            *by_type.entry(point.event_type.clone()).or_insert(0) += 1;
        }

        self.total_events = window.len() as u64;
        self.events_by_type = by_type;
    }

    /// Series for a type, if any point of that type was recorded
    pub fn series(&self, event_type: &str) -> Option<&VecDeque<TimeSeriesPoint>> {
        self.time_series_data.get(event_type)
    }

    /// Last value recorded for `<event_type>.<key>`
    pub fn recent_value(&self, event_type: &str, key: &str) -> Option<&Value> {
        self.recent_values.get(&recent_key(event_type, key))
    }
}

/// Composite key used by `recent_values`
pub fn recent_key(event_type: &str, key: &str) -> String {
    format!("{}.{}", event_type, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Payload;
    use chrono::{Duration, TimeZone};

    fn point(event_type: &str, ts: DateTime<Utc>, key: &str, value: i64) -> DataPoint {
        DataPoint::from_payload(
            Payload::new(event_type, "test").at(ts).with_value(key, value),
            ts,
        )
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_record_updates_all_fields() {
        let mut metrics = Metrics::new();
        metrics.record(&point("sales", base_time(), "amount", 100), 100);
        metrics.record(&point("users", base_time(), "active", 7), 100);
        metrics.record(&point("sales", base_time(), "amount", 200), 100);

        assert_eq!(metrics.total_events, 3);
        assert_eq!(metrics.events_by_type["sales"], 2);
        assert_eq!(metrics.events_by_type["users"], 1);
        assert_eq!(metrics.recent_value("sales", "amount"), Some(&Value::Int(200)));
        assert_eq!(metrics.recent_value("users", "active"), Some(&Value::Int(7)));
        assert_eq!(metrics.series("sales").map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_recent_values_follow_arrival_not_timestamp() {
        let mut metrics = Metrics::new();
        let later = base_time() + Duration::hours(1);

        metrics.record(&point("sales", later, "amount", 1), 100);
        metrics.record(&point("sales", base_time(), "amount", 2), 100);

        assert_eq!(metrics.recent_value("sales", "amount"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_series_evicts_oldest_first() {
        let mut metrics = Metrics::new();
        for i in 0..5 {
            metrics.record(&point("cpu", base_time() - Duration::minutes(i), "load", i), 3);
        }

        let series = metrics.series("cpu").unwrap();
        let loads: Vec<_> = series.iter().map(|p| p.values["load"].clone()).collect();
        assert_eq!(loads, vec![Value::Int(2), Value::Int(3), Value::Int(4)]);
    }

    #[test]
    fn test_replace_counts_keeps_values_and_series() {
        let mut metrics = Metrics::new();
        metrics.record(&point("sales", base_time(), "amount", 100), 100);
        metrics.record(&point("users", base_time(), "active", 3), 100);

        let window = vec![point("sales", base_time(), "amount", 100)];
        metrics.replace_counts(&window);

        assert_eq!(metrics.total_events, 1);
        assert_eq!(metrics.events_by_type.len(), 1);
        assert_eq!(metrics.events_by_type["sales"], 1);
        assert_eq!(metrics.recent_values.len(), 2);
        assert_eq!(metrics.time_series_data.len(), 2);
    }

    #[test]
    fn test_json_shape() {
        let mut metrics = Metrics::new();
        metrics.record(&point("sales", base_time(), "amount", 100), 100);

        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["totalEvents"], 1);
        assert_eq!(json["eventsByType"]["sales"], 1);
        assert_eq!(json["recentValues"]["sales.amount"], 100);
        assert_eq!(json["timeSeriesData"]["sales"][0]["values"]["amount"], 100);
        assert_eq!(
            json["timeSeriesData"]["sales"][0]["timestamp"],
            "2024-05-01T10:00:00Z"
        );
    }
}
