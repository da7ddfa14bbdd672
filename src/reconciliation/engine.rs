//! The reconciliation entry point for one worker-day.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::config::ToleranceConfig;
use crate::error::EngineResult;
use crate::models::{AttendanceOutcome, Interval, Schedule};

use super::adherence::out_of_adherence_minutes;
use super::check_in::select_check_in;
use super::check_out::select_check_out;
use super::offline::{OfflineInputs, offline_minutes};
use super::spans::Span;
use super::window::ShiftWindow;

/// Reconciles a worker's presence intervals against their schedule.
///
/// This function:
/// 1. Builds the shift window, moving the end to the next day for overnight shifts
/// 2. Places every interval on the calendar
/// 3. Selects the check-in and derives present, late or absent
/// 4. Selects the checkout, which stays empty while the shift is in progress
/// 5. Sums offline minutes inside the shift
/// 6. Sums connected minutes past the scheduled end
///
/// The function is pure: the same inputs always produce the same outcome.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::InvalidSchedule`] for a rest day or
/// a zero-length shift.
///
/// # Example
///
/// ```
/// use attendance_engine::config::ToleranceConfig;
/// use attendance_engine::models::{AttendanceStatus, Interval, Schedule};
/// use attendance_engine::reconciliation::reconcile;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let time = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// let schedule = Schedule {
///     worker_id: "W-1".to_string(),
///     date,
///     shift_start: time(9, 0),
///     shift_end: time(17, 0),
///     break_start: None,
///     break_end: None,
///     is_rest_day: false,
/// };
///
/// let outcome = reconcile(
///     &[Interval::new(time(8, 55), 480)],
///     &[Interval::new(time(16, 58), 10)],
///     &schedule,
///     date.and_time(time(18, 0)),
///     &ToleranceConfig::default(),
/// )
/// .unwrap();
///
/// assert_eq!(outcome.status, AttendanceStatus::Present);
/// assert_eq!(outcome.check_out, Some(time(16, 58)));
/// assert_eq!(outcome.out_of_adherence_minutes, 0);
/// ```
pub fn reconcile(
    connected: &[Interval],
    disconnected: &[Interval],
    schedule: &Schedule,
    now: NaiveDateTime,
    tolerances: &ToleranceConfig,
) -> EngineResult<AttendanceOutcome> {
    let window = ShiftWindow::new(schedule, tolerances)?;

    let connected_spans = window.anchor_all(connected);
    let disconnected_spans = window.anchor_all(disconnected);

    let check_in = select_check_in(&connected_spans, &window);
    let check_out = select_check_out(&disconnected_spans, check_in.instant, &window, now);

    let excluded_break = if tolerances.exclude_break_from_offline {
        schedule
            .break_window()
            .map(|(start, end)| Span::new(start, end))
    } else {
        None
    };

    let offline = offline_minutes(
        &window,
        OfflineInputs {
            connected: &connected_spans,
            disconnected: &disconnected_spans,
            check_in: check_in.instant,
            excluded_break,
            now,
        },
    );
    let out_of_adherence = out_of_adherence_minutes(&connected_spans, check_out, &window);

    debug!(
        worker_id = %schedule.worker_id,
        date = %schedule.date,
        status = %check_in.status,
        check_in = ?check_in.instant,
        check_out = ?check_out,
        offline_minutes = offline,
        out_of_adherence_minutes = out_of_adherence,
        "Reconciled worker-day"
    );

    Ok(AttendanceOutcome {
        worker_id: schedule.worker_id.clone(),
        date: schedule.date,
        check_in: check_in.instant.map(|t| t.time()),
        check_out: check_out.map(|t| t.time()),
        status: check_in.status,
        offline_minutes: offline,
        out_of_adherence_minutes: out_of_adherence,
    })
}
