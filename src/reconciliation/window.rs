//! Shift window construction and interval anchoring.
//!
//! This module turns a [`Schedule`] and the tolerance windows into absolute
//! instants, and places intervals onto the correct calendar day so every
//! later comparison happens between absolute instants.
//!
//! An interval with a known day offset is placed on exactly that day. One
//! with only a time of day is placed relative to the shift.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::ToleranceConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Interval, Schedule};

use super::spans::Span;

/// The absolute instants one worker-day is reconciled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    /// The schedule date.
    pub date: NaiveDate,
    /// Scheduled start.
    pub start: NaiveDateTime,
    /// Scheduled end, on the next day for overnight shifts.
    pub end: NaiveDateTime,
    /// Earliest instant a connection counts as this shift's check-in.
    pub earliest_valid_checkin: NaiveDateTime,
    /// Latest instant a connection is still on time.
    pub lateness_limit: NaiveDateTime,
    /// Start of the window in which a disconnect is the checkout.
    pub checkout_window_start: NaiveDateTime,
    /// Latest instant a disconnect can still be this shift's checkout.
    pub latest_valid_checkout: NaiveDateTime,
    overnight: bool,
}

impl ShiftWindow {
    /// Builds the window for a schedule.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSchedule`] for rest days and for shifts
    /// whose start and end coincide.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::config::ToleranceConfig;
    /// use attendance_engine::models::Schedule;
    /// use attendance_engine::reconciliation::ShiftWindow;
    /// use chrono::{NaiveDate, NaiveTime};
    ///
    /// let schedule = Schedule {
    ///     worker_id: "W-1".to_string(),
    ///     date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
    ///     shift_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    ///     shift_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    ///     break_start: None,
    ///     break_end: None,
    ///     is_rest_day: false,
    /// };
    /// let window = ShiftWindow::new(&schedule, &ToleranceConfig::default()).unwrap();
    /// assert_eq!(window.earliest_valid_checkin.time(), NaiveTime::from_hms_opt(6, 0, 0).unwrap());
    /// assert_eq!(window.latest_valid_checkout.time(), NaiveTime::from_hms_opt(20, 0, 0).unwrap());
    /// ```
    pub fn new(schedule: &Schedule, tolerances: &ToleranceConfig) -> EngineResult<Self> {
        if schedule.is_rest_day {
            return Err(EngineError::InvalidSchedule {
                worker_id: schedule.worker_id.clone(),
                date: schedule.date,
                message: "rest days are not reconciled".to_string(),
            });
        }
        if schedule.shift_start == schedule.shift_end {
            return Err(EngineError::InvalidSchedule {
                worker_id: schedule.worker_id.clone(),
                date: schedule.date,
                message: format!("shift starts and ends at {}", schedule.shift_start),
            });
        }

        let start = schedule.start_instant();
        let end = schedule.end_instant();

        Ok(Self {
            date: schedule.date,
            start,
            end,
            earliest_valid_checkin: start - tolerances.early_checkin_window(),
            lateness_limit: start + tolerances.lateness_tolerance(),
            checkout_window_start: end - tolerances.checkout_match_window(),
            latest_valid_checkout: end + tolerances.max_overtime_window(),
            overnight: schedule.crosses_midnight(),
        })
    }

    /// Scheduled shift length in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Places a time of day with no known calendar day.
    ///
    /// Times fall on the schedule date, except that for an overnight shift
    /// a time before the early check-in window belongs to the next day.
    pub fn anchor(&self, time: NaiveTime) -> NaiveDateTime {
        let same_day = self.date.and_time(time);
        if self.overnight && same_day < self.earliest_valid_checkin {
            same_day + Duration::days(1)
        } else {
            same_day
        }
    }

    /// Places an interval on the calendar as an absolute span.
    pub fn anchor_interval(&self, interval: &Interval) -> Span {
        let start = match interval.day_offset {
            Some(offset) => {
                self.date.and_time(interval.start) + Duration::days(i64::from(offset))
            }
            None => self.anchor(interval.start),
        };
        Span::from_minutes(start, interval.duration_minutes)
    }

    /// Places every interval, returning spans sorted by start.
    ///
    /// Intervals dated after the schedule date only belong to this shift up
    /// to the latest valid checkout. Later ones are the next day's activity
    /// and are dropped.
    pub fn anchor_all(&self, intervals: &[Interval]) -> Vec<Span> {
        let mut spans: Vec<Span> = intervals
            .iter()
            .filter_map(|i| {
                let span = self.anchor_interval(i);
                let next_day = i.day_offset.is_some_and(|d| d > 0);
                (!next_day || span.start <= self.latest_valid_checkout).then_some(span)
            })
            .collect();
        spans.sort();
        spans
    }
}
