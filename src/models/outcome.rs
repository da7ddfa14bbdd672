//! Attendance outcome models.
//!
//! This module contains the [`AttendanceOutcome`] type produced once per
//! worker-date with a non-rest schedule.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::Schedule;

/// The attendance verdict for a worker-day.
///
/// # Example
///
/// ```
/// use attendance_engine::models::AttendanceStatus;
///
/// assert_eq!(AttendanceStatus::Late.to_string(), "Late");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Checked in within the lateness tolerance.
    Present,
    /// Checked in after the lateness tolerance.
    Late,
    /// No qualifying check-in.
    Absent,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "Present"),
            AttendanceStatus::Late => write!(f, "Late"),
            AttendanceStatus::Absent => write!(f, "Absent"),
        }
    }
}

/// The reconciled attendance of one worker on one date.
///
/// Invariants: an absent outcome has no check-in, `offline_minutes` never
/// exceeds the scheduled shift length, and `check_out` is only set once the
/// scheduled end has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceOutcome {
    /// The worker reconciled.
    pub worker_id: String,
    /// The schedule date.
    pub date: NaiveDate,
    /// Time of day of the selected check-in.
    pub check_in: Option<NaiveTime>,
    /// Time of day of the selected checkout.
    pub check_out: Option<NaiveTime>,
    /// Present, late or absent.
    pub status: AttendanceStatus,
    /// Minutes disconnected during the shift.
    pub offline_minutes: i64,
    /// Minutes connected after the scheduled end.
    pub out_of_adherence_minutes: i64,
}

impl AttendanceOutcome {
    /// The outcome of a scheduled worker with no qualifying presence.
    pub fn absent(schedule: &Schedule) -> Self {
        Self {
            worker_id: schedule.worker_id.clone(),
            date: schedule.date,
            check_in: None,
            check_out: None,
            status: AttendanceStatus::Absent,
            offline_minutes: schedule.duration_minutes().max(0),
            out_of_adherence_minutes: 0,
        }
    }

    /// Returns true if the worker showed up, late or not.
    pub fn attended(&self) -> bool {
        self.status != AttendanceStatus::Absent
    }
}
