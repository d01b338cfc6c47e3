//! Server configuration
//!
//! Every setting has a default and can be overridden through an
//! `ANALYTICS_*` environment variable. Values that fail to parse are
//! logged and replaced by the default.

use std::env;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::processing::AggregatorConfig;

pub const ENV_BIND: &str = "ANALYTICS_BIND";
pub const ENV_REFRESH_INTERVAL_SECS: &str = "ANALYTICS_REFRESH_INTERVAL_SECS";
pub const ENV_WINDOW_SECS: &str = "ANALYTICS_WINDOW_SECS";
pub const ENV_SERIES_CAPACITY: &str = "ANALYTICS_SERIES_CAPACITY";
pub const ENV_BROADCAST_CAPACITY: &str = "ANALYTICS_BROADCAST_CAPACITY";
pub const ENV_MOCK_EVENTS: &str = "ANALYTICS_MOCK_EVENTS";
pub const ENV_LOG_FORMAT: &str = "ANALYTICS_LOG_FORMAT";

/// Log output format for the server binary
///
/// Read separately from `AnalyticsConfig` because logging must be set up
/// before the rest of the config is parsed and its warnings emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unknown values fall back to `Text` silently; no subscriber exists yet
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(ENV_LOG_FORMAT)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Full server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// HTTP listen address
    pub bind: SocketAddr,
    pub aggregator: AggregatorConfig,
    /// Buffered snapshots per WebSocket subscriber before it lags
    pub broadcast_capacity: usize,
    /// Number of mock event pairs stored at startup
    pub mock_events: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            aggregator: AggregatorConfig::default(),
            broadcast_capacity: 1024,
            mock_events: 0,
        }
    }
}

impl AnalyticsConfig {
    /// Load config from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let refresh_secs = parse_or(
            &lookup,
            ENV_REFRESH_INTERVAL_SECS,
            defaults.aggregator.refresh_interval.as_secs(),
        );
        let window_secs = parse_or(&lookup, ENV_WINDOW_SECS, defaults.aggregator.window.as_secs());

        Self {
            bind: parse_or(&lookup, ENV_BIND, defaults.bind),
            aggregator: AggregatorConfig {
                refresh_interval: Duration::from_secs(refresh_secs),
                window: Duration::from_secs(window_secs),
                series_capacity: parse_or(
                    &lookup,
                    ENV_SERIES_CAPACITY,
                    defaults.aggregator.series_capacity,
                ),
            },
            broadcast_capacity: parse_or(&lookup, ENV_BROADCAST_CAPACITY, defaults.broadcast_capacity),
            mock_events: parse_or(&lookup, ENV_MOCK_EVENTS, defaults.mock_events),
        }
        .sanitized()
    }

    /// Replace settings that would break the runtime with their defaults
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.aggregator.refresh_interval.is_zero() {
            warn!(key = ENV_REFRESH_INTERVAL_SECS, "Refresh interval must be positive, using default");
            self.aggregator.refresh_interval = defaults.aggregator.refresh_interval;
        }
        if self.broadcast_capacity == 0 {
            warn!(key = ENV_BROADCAST_CAPACITY, "Broadcast capacity must be positive, using default");
            self.broadcast_capacity = defaults.broadcast_capacity;
        }
        self
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080)
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                warn!(key, value = %raw, error = %e, "Invalid config value, using default");
                default
            }
        },
        None => default,
    }
}
