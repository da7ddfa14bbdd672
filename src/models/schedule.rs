//! Schedule model.
//!
//! A [`Schedule`] is the authoritative shift for one worker on one date.
//! Shifts whose end time is earlier than their start time cross midnight
//! and end on the following day.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// The scheduled shift for a worker on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// The worker this schedule belongs to.
    pub worker_id: String,
    /// The date the shift starts on.
    pub date: NaiveDate,
    /// Scheduled start time.
    pub shift_start: NaiveTime,
    /// Scheduled end time. Earlier than `shift_start` for overnight shifts.
    pub shift_end: NaiveTime,
    /// Start of the scheduled break, if any.
    #[serde(default)]
    pub break_start: Option<NaiveTime>,
    /// End of the scheduled break, if any.
    #[serde(default)]
    pub break_end: Option<NaiveTime>,
    /// Rest days are never reconciled.
    #[serde(default)]
    pub is_rest_day: bool,
}

impl Schedule {
    /// Returns true if the shift ends on the day after it starts.
    pub fn crosses_midnight(&self) -> bool {
        self.shift_end < self.shift_start
    }

    /// The absolute instant the shift starts.
    pub fn start_instant(&self) -> NaiveDateTime {
        self.date.and_time(self.shift_start)
    }

    /// The absolute instant the shift ends, on the next day for overnight shifts.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::models::Schedule;
    /// use chrono::{NaiveDate, NaiveTime};
    ///
    /// let schedule = Schedule {
    ///     worker_id: "W-1".to_string(),
    ///     date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
    ///     shift_start: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
    ///     shift_end: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
    ///     break_start: None,
    ///     break_end: None,
    ///     is_rest_day: false,
    /// };
    /// assert!(schedule.crosses_midnight());
    /// assert_eq!(schedule.end_instant().date(), NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
    /// assert_eq!(schedule.duration_minutes(), 480);
    /// ```
    pub fn end_instant(&self) -> NaiveDateTime {
        let end = self.date.and_time(self.shift_end);
        if self.crosses_midnight() {
            end + Duration::days(1)
        } else {
            end
        }
    }

    /// Scheduled length of the shift in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_instant() - self.start_instant()).num_minutes()
    }

    /// The break as absolute instants, if both ends are scheduled.
    ///
    /// The break is placed inside the shift: a break time earlier than the
    /// shift start belongs to the following day.
    pub fn break_window(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let (start, end) = (self.break_start?, self.break_end?);
        let place = |t: NaiveTime| {
            let instant = self.date.and_time(t);
            if t < self.shift_start {
                instant + Duration::days(1)
            } else {
                instant
            }
        };
        let (break_start, break_end) = (place(start), place(end));
        (break_end > break_start).then_some((break_start, break_end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn schedule(start: NaiveTime, end: NaiveTime) -> Schedule {
        Schedule {
            worker_id: "W-1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            shift_start: start,
            shift_end: end,
            break_start: None,
            break_end: None,
            is_rest_day: false,
        }
    }

    #[test]
    fn test_day_shift_instants() {
        let s = schedule(time(9, 0), time(17, 0));
        assert!(!s.crosses_midnight());
        assert_eq!(s.end_instant().date(), s.date);
        assert_eq!(s.duration_minutes(), 480);
    }

    #[test]
    fn test_overnight_shift_ends_next_day() {
        let s = schedule(time(22, 0), time(6, 0));
        assert_eq!(
            s.end_instant(),
            NaiveDate::from_ymd_opt(2025, 3, 11).unwrap().and_time(time(6, 0))
        );
        assert_eq!(s.duration_minutes(), 480);
    }

    #[test]
    fn test_zero_length_shift() {
        let s = schedule(time(9, 0), time(9, 0));
        assert!(!s.crosses_midnight());
        assert_eq!(s.duration_minutes(), 0);
    }

    #[test]
    fn test_break_window_day_shift() {
        let mut s = schedule(time(9, 0), time(17, 0));
        s.break_start = Some(time(13, 0));
        s.break_end = Some(time(13, 45));
        let (start, end) = s.break_window().unwrap();
        assert_eq!((end - start).num_minutes(), 45);
    }

    #[test]
    fn test_break_window_after_midnight() {
        let mut s = schedule(time(22, 0), time(6, 0));
        s.break_start = Some(time(23, 45));
        s.break_end = Some(time(0, 15));
        let (start, end) = s.break_window().unwrap();
        assert_eq!(start.date(), s.date);
        assert_eq!(end.date(), s.date.succ_opt().unwrap());
        assert_eq!((end - start).num_minutes(), 30);
    }

    #[test]
    fn test_break_window_requires_both_ends() {
        let mut s = schedule(time(9, 0), time(17, 0));
        s.break_start = Some(time(13, 0));
        assert!(s.break_window().is_none());
    }

    #[test]
    fn test_schedule_deserialization_defaults() {
        let json = r#"{
            "worker_id": "W-1",
            "date": "2025-03-10",
            "shift_start": "09:00:00",
            "shift_end": "17:00:00"
        }"#;
        let s: Schedule = serde_json::from_str(json).unwrap();
        assert!(!s.is_rest_day);
        assert!(s.break_start.is_none());
    }
}
