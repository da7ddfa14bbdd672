//! Check-in selection and punctuality.
//!
//! The check-in is the earliest connection that starts inside the shift's
//! check-in window: no earlier than the early check-in window before shift
//! start, and no later than the scheduled end.

use chrono::NaiveDateTime;

use crate::models::AttendanceStatus;

use super::spans::Span;
use super::window::ShiftWindow;

/// The selected check-in and the status it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInSelection {
    /// The check-in instant, `None` when the worker never showed up.
    pub instant: Option<NaiveDateTime>,
    /// Present, late or absent.
    pub status: AttendanceStatus,
}

/// Selects the check-in from connected spans.
///
/// A check-in at or before the lateness limit is
/// [`AttendanceStatus::Present`], after it [`AttendanceStatus::Late`], and
/// no qualifying connection is [`AttendanceStatus::Absent`].
pub fn select_check_in(connected: &[Span], window: &ShiftWindow) -> CheckInSelection {
    let instant = connected
        .iter()
        .map(|s| s.start)
        .filter(|start| *start >= window.earliest_valid_checkin && *start <= window.end)
        .min();

    let status = match instant {
        None => AttendanceStatus::Absent,
        Some(at) if at <= window.lateness_limit => AttendanceStatus::Present,
        Some(_) => AttendanceStatus::Late,
    };

    CheckInSelection { instant, status }
}
