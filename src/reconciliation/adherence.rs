//! Out-of-adherence accounting.
//!
//! A worker who stays connected past the scheduled end is out of
//! adherence for that time, up to the checkout. Leaving on time, or having
//! no checkout at all, yields zero.

use chrono::NaiveDateTime;

use super::spans::{Span, merge_spans, total_minutes};
use super::window::ShiftWindow;

/// Minutes of connected time between the scheduled end and the checkout.
pub fn out_of_adherence_minutes(
    connected: &[Span],
    check_out: Option<NaiveDateTime>,
    window: &ShiftWindow,
) -> i64 {
    let Some(check_out) = check_out else {
        return 0;
    };
    if check_out <= window.end {
        return 0;
    }

    let overtime: Vec<Span> = connected
        .iter()
        .filter_map(|s| s.clip(window.end, check_out))
        .collect();
    total_minutes(&merge_spans(overtime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToleranceConfig;
    use crate::models::{Interval, Schedule};
    use chrono::{NaiveDate, NaiveTime};

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn window() -> ShiftWindow {
        let schedule = Schedule {
            worker_id: "W-1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            shift_start: time(9, 0),
            shift_end: time(17, 0),
            break_start: None,
            break_end: None,
            is_rest_day: false,
        };
        ShiftWindow::new(&schedule, &ToleranceConfig::default()).unwrap()
    }

    fn span(w: &ShiftWindow, h: u32, m: u32, minutes: i64) -> Span {
        w.anchor_interval(&Interval::new(time(h, m), minutes))
    }

    #[test]
    fn test_connected_past_end_until_checkout() {
        let w = window();
        let connected = [span(&w, 8, 55, 500), span(&w, 17, 10, 30)];
        let check_out = Some(w.date.and_time(time(17, 40)));
        assert_eq!(out_of_adherence_minutes(&connected, check_out, &w), 40);
    }

    #[test]
    fn test_left_on_time_is_zero() {
        let w = window();
        let connected = [span(&w, 8, 55, 600)];
        let check_out = Some(w.date.and_time(time(16, 58)));
        assert_eq!(out_of_adherence_minutes(&connected, check_out, &w), 0);
    }

    #[test]
    fn test_no_checkout_is_zero() {
        let w = window();
        let connected = [span(&w, 8, 55, 600)];
        assert_eq!(out_of_adherence_minutes(&connected, None, &w), 0);
    }

    #[test]
    fn test_overlapping_connections_counted_once() {
        let w = window();
        let connected = [span(&w, 16, 0, 90), span(&w, 17, 0, 20), span(&w, 17, 10, 10)];
        let check_out = Some(w.date.and_time(time(18, 0)));
        assert_eq!(out_of_adherence_minutes(&connected, check_out, &w), 30);
    }
}
