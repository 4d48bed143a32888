//! Time utilities for sync-at-time
//!
//! Provides wall-clock access for window evaluation and the time-of-day
//! type used for window boundaries.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `SYNC_AT_TIME_MOCK_TIME` environment variable can be
//! set to shift the wall clock for every time-sensitive operation. This is
//! useful for watching a window open and close without waiting for it.
//!
//! Format: `YYYY-MM-DD HH:MM:SS`, interpreted as UTC (e.g., `2025-12-25 14:30:00`)
//!
//! Example:
//! ```bash
//! SYNC_AT_TIME_MOCK_TIME="2025-12-25 07:59:50" sync-at-time --config config.toml
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, OnceLock};
use thiserror::Error;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "SYNC_AT_TIME_MOCK_TIME";

/// Format accepted by the mock time variable
pub const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cached mock time offset from the real time when the process started.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // This is the internal implementation that wraps Utc::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match NaiveDateTime::parse_from_str(&mock_time_str, MOCK_TIME_FORMAT) {
                    Ok(naive_dt) => {
                        let offset = naive_dt.and_utc().signed_duration_since(Utc::now());
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    Err(_) => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = MOCK_TIME_FORMAT,
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // This is the wrapper that provides mock time support
pub fn now() -> DateTime<Utc> {
    let real_now = Utc::now();

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Source of "now" for window evaluation
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The process wall clock (with mock time in debug builds)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(Mutex::new(at))
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Why a time-of-day string was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockParseError {
    #[error("expected HH:MM:SS, found {found} field(s)")]
    FieldCount { found: usize },

    #[error("'{part}' is not a number")]
    NotANumber { part: String },

    #[error("{unit} '{value}' out of range")]
    OutOfRange { unit: &'static str, value: String },
}

/// Offset from midnight written as hours, minutes and seconds.
///
/// Fields are not limited to a clock face: `24:00:00` is the following
/// midnight and `25:30:00` is 01:30 the next day, the same way the fields
/// of a calendar date normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

impl ClockTime {
    pub const fn new(hour: u16, minute: u16, second: u16) -> Self {
        Self { hour, minute, second }
    }

    /// Parse `H:M:S` where each field is one or more decimal digits.
    ///
    /// Padding is optional (`8:5:0` and `08:05:00` are the same time).
    /// Anything other than exactly three unsigned numeric fields is
    /// rejected, including surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, ClockParseError> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(ClockParseError::FieldCount { found: parts.len() });
        }

        let mut fields = [0u16; 3];
        for ((slot, part), unit) in fields.iter_mut().zip(&parts).zip(["hour", "minute", "second"]) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ClockParseError::NotANumber {
                    part: part.to_string(),
                });
            }
            // All digits, so the only failure left is overflow
            *slot = part.parse().map_err(|_| ClockParseError::OutOfRange {
                unit,
                value: part.to_string(),
            })?;
        }

        let [hour, minute, second] = fields;
        Ok(Self { hour, minute, second })
    }

    /// Returns seconds since midnight
    pub fn as_seconds_from_midnight(&self) -> u32 {
        (self.hour as u32) * 3600 + (self.minute as u32) * 60 + self.second as u32
    }

    /// Offset from midnight as a chrono duration
    pub fn since_midnight(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.as_seconds_from_midnight() as i64)
    }
}

impl PartialOrd for ClockTime {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClockTime {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_seconds_from_midnight()
            .cmp(&other.as_seconds_from_midnight())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}
