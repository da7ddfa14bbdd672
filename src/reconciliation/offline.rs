//! Offline-minute accounting.
//!
//! Offline time inside the shift is the union of three kinds of span:
//!
//! - explicit disconnects,
//! - the gap between shift start and a late check-in,
//! - the gap between the end of the last disconnect and the end of the
//!   accounting window when the worker never reconnected.
//!
//! The union is clipped to the shift (and to `now` for a shift in
//! progress), so the total can never exceed the scheduled length.

use chrono::NaiveDateTime;

use super::spans::{Span, merge_spans, subtract_span, total_minutes};
use super::window::ShiftWindow;

/// Inputs to the offline calculation for one worker-day.
#[derive(Debug, Clone, Copy)]
pub struct OfflineInputs<'a> {
    /// Connected spans, sorted by start.
    pub connected: &'a [Span],
    /// Disconnected spans, sorted by start.
    pub disconnected: &'a [Span],
    /// The selected check-in, `None` for an absent worker.
    pub check_in: Option<NaiveDateTime>,
    /// Scheduled break to exclude, if configured.
    pub excluded_break: Option<Span>,
    /// The reconciliation run time.
    pub now: NaiveDateTime,
}

/// Minutes the worker was offline during the shift.
///
/// An absent worker is offline for the whole shift, in progress or not.
pub fn offline_minutes(window: &ShiftWindow, inputs: OfflineInputs<'_>) -> i64 {
    let Some(check_in) = inputs.check_in else {
        return window.duration_minutes();
    };

    let window_end = window.end.min(inputs.now);
    if window_end <= window.start {
        return 0;
    }

    let mut offline: Vec<Span> = inputs.disconnected.to_vec();

    if check_in > window.start {
        offline.push(Span::new(window.start, check_in));
    }

    if let Some(trailing) = trailing_gap(inputs.connected, inputs.disconnected, check_in, window_end)
    {
        offline.push(trailing);
    }

    let clipped: Vec<Span> = offline
        .iter()
        .filter_map(|s| s.clip(window.start, window_end))
        .collect();
    let mut merged = merge_spans(clipped);

    if let Some(cut) = inputs.excluded_break {
        merged = subtract_span(&merged, cut);
    }

    total_minutes(&merged).min(window.duration_minutes())
}

/// The time after the last disconnect when no connection follows it.
fn trailing_gap(
    connected: &[Span],
    disconnected: &[Span],
    check_in: NaiveDateTime,
    window_end: NaiveDateTime,
) -> Option<Span> {
    let last = disconnected
        .iter()
        .filter(|s| s.start >= check_in && s.start < window_end)
        .max_by_key(|s| s.start)?;

    let reconnected = connected.iter().any(|c| c.start > last.start);
    if reconnected || last.end >= window_end {
        return None;
    }
    Some(Span::new(last.end, window_end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToleranceConfig;
    use crate::models::{Interval, Schedule};
    use chrono::{Duration, NaiveDate, NaiveTime};

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn window(start: NaiveTime, end: NaiveTime) -> ShiftWindow {
        let schedule = Schedule {
            worker_id: "W-1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            shift_start: start,
            shift_end: end,
            break_start: None,
            break_end: None,
            is_rest_day: false,
        };
        ShiftWindow::new(&schedule, &ToleranceConfig::default()).unwrap()
    }

    fn span(w: &ShiftWindow, h: u32, m: u32, minutes: i64) -> Span {
        w.anchor_interval(&Interval::new(time(h, m), minutes))
    }

    fn inputs<'a>(
        connected: &'a [Span],
        disconnected: &'a [Span],
        check_in: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> OfflineInputs<'a> {
        OfflineInputs {
            connected,
            disconnected,
            check_in,
            excluded_break: None,
            now,
        }
    }

    #[test]
    fn test_absent_counts_whole_shift() {
        let w = window(time(9, 0), time(17, 0));
        assert_eq!(offline_minutes(&w, inputs(&[], &[], None, w.start)), 480);
    }

    #[test]
    fn test_disconnect_clipped_to_shift_end() {
        let w = window(time(9, 0), time(17, 0));
        let connected = [span(&w, 8, 55, 480)];
        let disconnected = [span(&w, 16, 58, 10)];
        let now = w.end + Duration::hours(1);
        let check_in = Some(connected[0].start);
        assert_eq!(
            offline_minutes(&w, inputs(&connected, &disconnected, check_in, now)),
            2
        );
    }

    #[test]
    fn test_late_arrival_gap_counts() {
        let w = window(time(9, 0), time(17, 0));
        let connected = [span(&w, 9, 25, 455)];
        let now = w.end + Duration::hours(1);
        assert_eq!(
            offline_minutes(&w, inputs(&connected, &[], Some(connected[0].start), now)),
            25
        );
    }

    #[test]
    fn test_overlapping_disconnects_counted_once() {
        let w = window(time(9, 0), time(17, 0));
        let connected = [span(&w, 8, 55, 60), span(&w, 11, 0, 360)];
        let disconnected = [span(&w, 10, 0, 30), span(&w, 10, 15, 30), span(&w, 10, 15, 30)];
        let now = w.end + Duration::hours(1);
        assert_eq!(
            offline_minutes(
                &w,
                inputs(&connected, &disconnected, Some(connected[0].start), now)
            ),
            45
        );
    }

    #[test]
    fn test_never_reconnected_counts_until_shift_end() {
        let w = window(time(9, 0), time(17, 0));
        let connected = [span(&w, 9, 0, 300)];
        let disconnected = [span(&w, 14, 0, 30)];
        let now = w.end + Duration::hours(1);
        assert_eq!(
            offline_minutes(
                &w,
                inputs(&connected, &disconnected, Some(connected[0].start), now)
            ),
            180
        );
    }

    #[test]
    fn test_in_progress_shift_stops_at_now() {
        let w = window(time(9, 0), time(17, 0));
        let connected = [span(&w, 9, 0, 300)];
        let disconnected = [span(&w, 14, 0, 10)];
        let now = w.date.and_time(time(15, 0));
        assert_eq!(
            offline_minutes(
                &w,
                inputs(&connected, &disconnected, Some(connected[0].start), now)
            ),
            60
        );
    }

    #[test]
    fn test_before_shift_start_nothing_is_offline() {
        let w = window(time(9, 0), time(17, 0));
        let connected = [span(&w, 8, 0, 30)];
        let now = w.date.and_time(time(8, 45));
        assert_eq!(
            offline_minutes(&w, inputs(&connected, &[], Some(connected[0].start), now)),
            0
        );
    }

    #[test]
    fn test_break_excluded_when_configured() {
        let w = window(time(9, 0), time(17, 0));
        let connected = [span(&w, 9, 0, 240), span(&w, 14, 0, 180)];
        let disconnected = [span(&w, 13, 0, 60)];
        let now = w.end + Duration::hours(1);
        let mut i = inputs(&connected, &disconnected, Some(connected[0].start), now);
        assert_eq!(offline_minutes(&w, i), 60);

        i.excluded_break = Some(Span::new(
            w.date.and_time(time(13, 0)),
            w.date.and_time(time(13, 45)),
        ));
        assert_eq!(offline_minutes(&w, i), 15);
    }

    #[test]
    fn test_overnight_disconnect_after_midnight() {
        let w = window(time(22, 0), time(6, 0));
        let connected = [span(&w, 21, 55, 180), span(&w, 1, 30, 270)];
        let disconnected = [span(&w, 0, 55, 35)];
        let now = w.end + Duration::hours(2);
        assert_eq!(
            offline_minutes(
                &w,
                inputs(&connected, &disconnected, Some(connected[0].start), now)
            ),
            35
        );
    }
}
