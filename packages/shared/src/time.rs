//! Time-related utilities with clock abstraction for testability.
//!
//! All timestamps exchanged by Hyoshi are Unix epoch milliseconds carried as
//! `f64`, so that sub-millisecond precision survives the JSON round trip.

use chrono::{DateTime, TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in milliseconds, with sub-millisecond fraction
    fn now_millis(&self) -> f64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> f64 {
        now_millis()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: f64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: f64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> f64 {
        self.fixed_time
    }
}

/// Get current Unix timestamp in milliseconds (microsecond resolution)
pub fn now_millis() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1000.0
}

/// Convert a Unix timestamp (milliseconds) to RFC 3339 format in UTC.
///
/// Returns `None` for timestamps chrono cannot represent.
pub fn millis_to_rfc3339(timestamp_millis: f64) -> Option<String> {
    let micros = (timestamp_millis * 1000.0).round() as i64;
    let dt: DateTime<Utc> = Utc.timestamp_micros(micros).single()?;
    Some(dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
}
