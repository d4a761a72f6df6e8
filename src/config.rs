//! Tracker and publisher configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Unset or unparsable numeric values fall
//! back to defaults; only an unusable endpoint or listen address is an error.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::TrackerError;

/// Local development endpoint used when `TRACKER_WS_URL` is unset.
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:8000/api/ws/robot";

/// Fixed delay between a failed or closed session and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Upper bound on a single connect handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Exclusive upper bound of the logical coordinate range.
pub const DEFAULT_COORD_MAX: f64 = 100.0;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Top-level tracker configuration.
///
/// Loaded once at startup via [`TrackerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// WebSocket endpoint of the position publisher.
    pub endpoint: String,

    /// Fixed delay before a reconnect attempt. Not exponential, no jitter.
    /// Never zero.
    pub reconnect_delay: Duration,

    /// Time allowed for one connect handshake before it counts as failed.
    pub connect_timeout: Duration,

    /// Exclusive upper bound of the logical x/y range.
    pub coord_max: f64,

    /// Path of the boundary geometry asset.
    pub geometry_path: PathBuf,

    /// Capacity of the tracker event broadcast channel.
    pub event_bus_capacity: usize,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            coord_max: DEFAULT_COORD_MAX,
            geometry_path: PathBuf::from("assets/boundary.json"),
            event_bus_capacity: 1024,
            log_format: LogFormat::Pretty,
        }
    }
}

impl TrackerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidConfig`] if `TRACKER_WS_URL` is set
    /// but is not a `ws://` or `wss://` URL.
    pub fn from_env() -> Result<Self, TrackerError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidConfig`] for an unusable endpoint.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TrackerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let endpoint = lookup("TRACKER_WS_URL").unwrap_or(defaults.endpoint);
        validate_endpoint(&endpoint)?;

        // Zero would turn recovery into a busy retry loop.
        let reconnect_delay = parse_millis(lookup("TRACKER_RECONNECT_DELAY_MS"))
            .unwrap_or(defaults.reconnect_delay);
        let connect_timeout = parse_millis(lookup("TRACKER_CONNECT_TIMEOUT_MS"))
            .unwrap_or(defaults.connect_timeout);

        let coord_max = parse_value(lookup("TRACKER_COORD_MAX"), defaults.coord_max);
        let coord_max = if coord_max.is_finite() && coord_max > 0.0 {
            coord_max
        } else {
            DEFAULT_COORD_MAX
        };

        let geometry_path = lookup("TRACKER_GEOMETRY_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.geometry_path);

        let event_bus_capacity = parse_value(
            lookup("TRACKER_EVENT_BUS_CAPACITY"),
            defaults.event_bus_capacity,
        )
        .max(1);

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            endpoint,
            reconnect_delay,
            connect_timeout,
            coord_max,
            geometry_path,
            event_bus_capacity,
            log_format,
        })
    }
}

/// Development publisher configuration.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// Interval between two simulated position frames.
    pub update_interval: Duration,

    /// Inclusive lower bound of generated x.
    pub min_x: f64,
    /// Exclusive upper bound of generated x.
    pub max_x: f64,
    /// Inclusive lower bound of generated y.
    pub min_y: f64,
    /// Exclusive upper bound of generated y.
    pub max_y: f64,

    /// Capacity of the frame broadcast channel.
    pub channel_capacity: usize,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            update_interval: Duration::from_secs(1),
            min_x: 0.0,
            max_x: DEFAULT_COORD_MAX,
            min_y: 0.0,
            max_y: DEFAULT_COORD_MAX,
            channel_capacity: 256,
        }
    }
}

impl PublisherConfig {
    /// Loads publisher configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidConfig`] if `PUBLISHER_LISTEN_ADDR`
    /// is set but cannot be parsed as a [`SocketAddr`], or if a minimum
    /// bound is not below its maximum.
    pub fn from_env() -> Result<Self, TrackerError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the publisher configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`PublisherConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TrackerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let listen_addr = match lookup("PUBLISHER_LISTEN_ADDR") {
            Some(raw) => raw.parse().map_err(|e| {
                TrackerError::InvalidConfig(format!("PUBLISHER_LISTEN_ADDR={raw}: {e}"))
            })?,
            None => defaults.listen_addr,
        };

        let update_interval = Duration::from_millis(
            parse_value(lookup("PUBLISHER_UPDATE_INTERVAL_MS"), 1_000_u64).max(1),
        );

        let min_x = parse_value(lookup("PUBLISHER_MIN_X"), defaults.min_x);
        let max_x = parse_value(lookup("PUBLISHER_MAX_X"), defaults.max_x);
        let min_y = parse_value(lookup("PUBLISHER_MIN_Y"), defaults.min_y);
        let max_y = parse_value(lookup("PUBLISHER_MAX_Y"), defaults.max_y);

        // Comparisons against NaN are false, so NaN bounds are rejected too.
        let non_empty = min_x < max_x && min_y < max_y;
        if !non_empty {
            return Err(TrackerError::InvalidConfig(format!(
                "empty position bounds x=[{min_x}, {max_x}) y=[{min_y}, {max_y})"
            )));
        }

        Ok(Self {
            listen_addr,
            update_interval,
            min_x,
            max_x,
            min_y,
            max_y,
            channel_capacity: defaults.channel_capacity,
        })
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), TrackerError> {
    let has_host = endpoint
        .strip_prefix("ws://")
        .or_else(|| endpoint.strip_prefix("wss://"))
        .is_some_and(|rest| !rest.is_empty());
    if has_host {
        Ok(())
    } else {
        Err(TrackerError::InvalidConfig(format!(
            "endpoint must be a ws:// or wss:// URL, got {endpoint:?}"
        )))
    }
}

/// Parses a strictly positive millisecond count.
fn parse_millis(raw: Option<String>) -> Option<Duration> {
    raw.and_then(|v| v.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

/// Parses an optional raw value as `T`, returning `default` on missing
/// or invalid values.
fn parse_value<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let Ok(cfg) = TrackerConfig::from_lookup(lookup_from(&[])) else {
            panic!("defaults must be valid");
        };
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.reconnect_delay, Duration::from_secs(5));
        assert!((cfg.coord_max - 100.0).abs() < f64::EPSILON);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn overrides_are_applied() {
        let Ok(cfg) = TrackerConfig::from_lookup(lookup_from(&[
            ("TRACKER_WS_URL", "wss://tracker.example/ws"),
            ("TRACKER_RECONNECT_DELAY_MS", "250"),
            ("TRACKER_COORD_MAX", "50"),
            ("LOG_FORMAT", "json"),
        ])) else {
            panic!("valid overrides");
        };
        assert_eq!(cfg.endpoint, "wss://tracker.example/ws");
        assert_eq!(cfg.reconnect_delay, Duration::from_millis(250));
        assert!((cfg.coord_max - 50.0).abs() < f64::EPSILON);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn garbage_numbers_fall_back() {
        let Ok(cfg) = TrackerConfig::from_lookup(lookup_from(&[
            ("TRACKER_RECONNECT_DELAY_MS", "soon"),
            ("TRACKER_COORD_MAX", "-3"),
        ])) else {
            panic!("fallbacks must be valid");
        };
        assert_eq!(cfg.reconnect_delay, DEFAULT_RECONNECT_DELAY);
        assert!((cfg.coord_max - DEFAULT_COORD_MAX).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_reconnect_delay_falls_back_to_default() {
        let Ok(cfg) = TrackerConfig::from_lookup(lookup_from(&[
            ("TRACKER_RECONNECT_DELAY_MS", "0"),
            ("TRACKER_CONNECT_TIMEOUT_MS", "0"),
        ])) else {
            panic!("fallbacks must be valid");
        };
        assert_eq!(cfg.reconnect_delay, DEFAULT_RECONNECT_DELAY);
        assert_eq!(cfg.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    }

    #[test]
    fn connect_timeout_override() {
        let Ok(cfg) =
            TrackerConfig::from_lookup(lookup_from(&[("TRACKER_CONNECT_TIMEOUT_MS", "1500")]))
        else {
            panic!("valid override");
        };
        assert_eq!(cfg.connect_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn http_endpoint_is_rejected() {
        let result =
            TrackerConfig::from_lookup(lookup_from(&[("TRACKER_WS_URL", "http://localhost")]));
        assert!(matches!(result, Err(TrackerError::InvalidConfig(_))));
    }

    #[test]
    fn publisher_rejects_bad_addr() {
        let result =
            PublisherConfig::from_lookup(lookup_from(&[("PUBLISHER_LISTEN_ADDR", "nowhere")]));
        assert!(matches!(result, Err(TrackerError::InvalidConfig(_))));
    }

    #[test]
    fn publisher_rejects_empty_bounds() {
        let result = PublisherConfig::from_lookup(lookup_from(&[
            ("PUBLISHER_MIN_X", "10"),
            ("PUBLISHER_MAX_X", "10"),
        ]));
        assert!(matches!(result, Err(TrackerError::InvalidConfig(_))));
    }
}
