//! Presence interval models.
//!
//! A worker-day of presence data arrives as two lists of intervals:
//! connected (any logged-in or working state) and disconnected (an explicit
//! offline-style state). [`RawInterval`] is the record as delivered at the
//! ingestion boundary; [`Interval`] is the validated form the engine works on.
//!
//! A record may carry a day offset from the reconciled date. A record
//! without one is placed on the calendar relative to the shift.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EngineError, EngineResult};

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Longest duration accepted for a single state, one week.
const MAX_DURATION_MINUTES: f64 = 7.0 * 24.0 * 60.0;

/// Records are dated on the reconciled date or the day after it.
const MAX_DAY_OFFSET: u32 = 1;

/// An unvalidated presence interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInterval {
    /// Time of day the state began, `HH:MM:SS` or `HH:MM`.
    pub start: String,
    /// Length of the state in (possibly fractional) minutes.
    pub duration_minutes: f64,
    /// Days after the reconciled date the state began on, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_offset: Option<u32>,
}

impl RawInterval {
    /// Creates a raw interval with no known calendar day.
    pub fn new(start: impl Into<String>, duration_minutes: f64) -> Self {
        Self {
            start: start.into(),
            duration_minutes,
            day_offset: None,
        }
    }

    /// Marks the interval as starting `day_offset` days after the reconciled date.
    pub fn with_day_offset(mut self, day_offset: u32) -> Self {
        self.day_offset = Some(day_offset);
        self
    }

    /// Returns true if the interval is known to start after the reconciled date.
    pub fn is_next_day(&self) -> bool {
        self.day_offset.is_some_and(|d| d > 0)
    }
}

/// Raw connected and disconnected intervals for one worker-day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawWorkerIntervals {
    /// Intervals in a connected state.
    #[serde(default)]
    pub connected: Vec<RawInterval>,
    /// Intervals in a disconnected state.
    #[serde(default)]
    pub disconnected: Vec<RawInterval>,
}

impl RawWorkerIntervals {
    /// Appends another worker-day's intervals, keeping both lists sorted by start.
    pub fn merge(&mut self, other: RawWorkerIntervals) {
        self.connected.extend(other.connected);
        self.disconnected.extend(other.disconnected);
        sort_raw(&mut self.connected);
        sort_raw(&mut self.disconnected);
    }

    /// Returns true if neither list has any interval.
    pub fn is_empty(&self) -> bool {
        self.connected.is_empty() && self.disconnected.is_empty()
    }

    /// Returns true if every interval is known to start after the reconciled date.
    ///
    /// Such a worker-day only carries the tail of an overnight shift, so it
    /// says nothing about who was active on the reconciled date itself.
    pub fn is_next_day_only(&self) -> bool {
        !self.is_empty()
            && self
                .connected
                .iter()
                .chain(&self.disconnected)
                .all(RawInterval::is_next_day)
    }
}

/// Sorts raw intervals by calendar day, then time of day.
pub(crate) fn sort_raw(intervals: &mut [RawInterval]) {
    intervals.sort_by(|a, b| {
        (a.day_offset.unwrap_or(0), &a.start).cmp(&(b.day_offset.unwrap_or(0), &b.start))
    });
}

/// A validated presence interval: a time of day and a whole-minute duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// Days after the reconciled date the state began on, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_offset: Option<u32>,
    /// Time of day the state began.
    pub start: NaiveTime,
    /// Length of the state in whole minutes.
    pub duration_minutes: i64,
}

impl Interval {
    /// Creates an interval with no known calendar day.
    pub fn new(start: NaiveTime, duration_minutes: i64) -> Self {
        Self {
            day_offset: None,
            start,
            duration_minutes,
        }
    }

    /// Creates an interval starting `day_offset` days after the reconciled date.
    pub fn on_day(day_offset: u32, start: NaiveTime, duration_minutes: i64) -> Self {
        Self {
            day_offset: Some(day_offset),
            start,
            duration_minutes,
        }
    }

    /// Validates a raw interval.
    ///
    /// The start must parse as `HH:MM:SS` or `HH:MM`, and the duration must
    /// be finite, non-negative and at most a week. Fractional durations round to the
    /// nearest minute. A day offset, if present, is 0 or 1.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::models::{Interval, RawInterval};
    /// use chrono::NaiveTime;
    ///
    /// let interval = Interval::try_from_raw(&RawInterval::new("08:58", 499.6), "W-1").unwrap();
    /// assert_eq!(interval.start, NaiveTime::from_hms_opt(8, 58, 0).unwrap());
    /// assert_eq!(interval.duration_minutes, 500);
    ///
    /// assert!(Interval::try_from_raw(&RawInterval::new("25:00", 5.0), "W-1").is_err());
    /// ```
    pub fn try_from_raw(raw: &RawInterval, worker_id: &str) -> EngineResult<Self> {
        let start = parse_time(&raw.start).ok_or_else(|| EngineError::MalformedInterval {
            worker_id: worker_id.to_string(),
            message: format!("unparsable start time '{}'", raw.start),
        })?;

        if !raw.duration_minutes.is_finite()
            || raw.duration_minutes < 0.0
            || raw.duration_minutes > MAX_DURATION_MINUTES
        {
            return Err(EngineError::MalformedInterval {
                worker_id: worker_id.to_string(),
                message: format!("invalid duration {}", raw.duration_minutes),
            });
        }

        if let Some(offset) = raw.day_offset.filter(|d| *d > MAX_DAY_OFFSET) {
            return Err(EngineError::MalformedInterval {
                worker_id: worker_id.to_string(),
                message: format!("day offset {} outside 0..={}", offset, MAX_DAY_OFFSET),
            });
        }

        Ok(Self {
            day_offset: raw.day_offset,
            start,
            duration_minutes: raw.duration_minutes.round() as i64,
        })
    }

    /// Validates a list of raw intervals, dropping and logging malformed ones.
    ///
    /// The surviving intervals are returned sorted by start time.
    pub fn collect_valid(raw: &[RawInterval], worker_id: &str) -> Vec<Interval> {
        let mut intervals: Vec<Interval> = raw
            .iter()
            .filter_map(|r| match Interval::try_from_raw(r, worker_id) {
                Ok(interval) => Some(interval),
                Err(err) => {
                    warn!(worker_id = %worker_id, error = %err, "Dropping malformed interval");
                    None
                }
            })
            .collect();
        intervals.sort();
        intervals
    }
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
}

/// Validated connected and disconnected intervals for one worker-day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerIntervals {
    /// Connected intervals, sorted by start.
    pub connected: Vec<Interval>,
    /// Disconnected intervals, sorted by start.
    pub disconnected: Vec<Interval>,
}

impl WorkerIntervals {
    /// Validates both lists of a raw worker-day.
    pub fn from_raw(raw: &RawWorkerIntervals, worker_id: &str) -> Self {
        Self {
            connected: Interval::collect_valid(&raw.connected, worker_id),
            disconnected: Interval::collect_valid(&raw.disconnected, worker_id),
        }
    }
}
