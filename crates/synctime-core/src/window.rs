//! Daily sync window evaluation

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;
use synctime_config::WindowConfig;
use synctime_util::{ClockParseError, ClockTime};
use thiserror::Error;

/// Which end of the window a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Start => write!(f, "Start"),
            Boundary::End => write!(f, "End"),
        }
    }
}

/// Errors from evaluating a window
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("{boundary} time '{value}' is not in the format HH:MM:SS: {reason}")]
    InvalidTime {
        boundary: Boundary,
        value: String,
        #[source]
        reason: ClockParseError,
    },

    #[error("Time zone cannot be loaded: {0}")]
    UnknownTimeZone(String),
}

/// A parsed window: two times of day in one timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub start: ClockTime,
    pub end: ClockTime,
    pub zone: Tz,
}

/// The outcome of one evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub should_sync: bool,
    /// The instant the decision was made for, in the window's zone
    pub observed_time: DateTime<Tz>,
}

impl SyncWindow {
    /// Parse start, end and zone, in that order, failing on the first bad one.
    pub fn parse(config: &WindowConfig) -> Result<Self, WindowError> {
        let start = parse_boundary(Boundary::Start, &config.start)?;
        let end = parse_boundary(Boundary::End, &config.end)?;
        let zone = resolve_zone(&config.zone)?;
        Ok(Self { start, end, zone })
    }

    /// Start and end instants on the date `now` falls on in the window's zone.
    ///
    /// Each boundary is that date's midnight plus the boundary's offset in
    /// wall-clock time, so `24:00:00` is the next midnight and `25:30:00` is
    /// 01:30 the next day.
    pub fn bounds_for(&self, now: DateTime<Utc>) -> (DateTime<Tz>, DateTime<Tz>) {
        let today = now.with_timezone(&self.zone).date_naive();
        (
            at_local(&self.zone, wall_clock(today, self.start)),
            at_local(&self.zone, wall_clock(today, self.end)),
        )
    }

    /// Whether `now` lies strictly between today's start and end.
    ///
    /// A window whose end is not after its start contains nothing.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        let (start, end) = self.bounds_for(now);
        now > start && now < end
    }

    /// True when end is at or before start, so the window can never open
    pub fn is_degenerate(&self) -> bool {
        self.end <= self.start
    }

    pub fn evaluate(&self, now: DateTime<Utc>) -> Evaluation {
        Evaluation {
            should_sync: self.contains(now),
            observed_time: now.with_timezone(&self.zone),
        }
    }
}

/// Parse the configured window and classify `now` against it
pub fn evaluate(config: &WindowConfig, now: DateTime<Utc>) -> Result<Evaluation, WindowError> {
    Ok(SyncWindow::parse(config)?.evaluate(now))
}

fn parse_boundary(boundary: Boundary, value: &str) -> Result<ClockTime, WindowError> {
    ClockTime::parse(value).map_err(|reason| WindowError::InvalidTime {
        boundary,
        value: value.to_string(),
        reason,
    })
}

/// Resolve an IANA timezone name
pub fn resolve_zone(zone: &str) -> Result<Tz, WindowError> {
    zone.parse::<Tz>()
        .map_err(|_| WindowError::UnknownTimeZone(zone.to_string()))
}

fn wall_clock(date: NaiveDate, time: ClockTime) -> NaiveDateTime {
    let midnight = date.and_time(NaiveTime::MIN);
    midnight
        .checked_add_signed(time.since_midnight())
        .unwrap_or(NaiveDateTime::MAX)
}

/// Pin a wall-clock time in `zone` to an instant.
///
/// Ambiguous times (clocks falling back) take the earlier instant. Times in
/// a gap (clocks springing forward) are read with the offset in force
/// before the gap, which lands them just after it.
fn at_local(zone: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            // A day before `naive` read as UTC is before the transition for any UTC offset
            let before = naive.checked_sub_signed(Duration::days(1)).unwrap_or(naive);
            let offset = zone.offset_from_utc_datetime(&before).fix();
            let utc = naive - Duration::seconds(offset.local_minus_utc() as i64);
            zone.from_utc_datetime(&utc)
        }
    }
}
