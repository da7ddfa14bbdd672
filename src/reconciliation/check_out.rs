//! Checkout selection.
//!
//! Only disconnects that start after the check-in are candidates. A
//! disconnect inside the checkout match window (the last few minutes of
//! the shift) is preferred, the one closest to the scheduled end winning.
//! Otherwise the latest disconnect is the checkout, unless it falls beyond
//! the overtime window, in which case the worker left too late for this
//! shift and there is no checkout. A checkout is only given once the
//! scheduled end is strictly in the past.

use chrono::NaiveDateTime;

use super::spans::Span;
use super::window::ShiftWindow;

/// Selects the checkout instant from disconnected spans.
pub fn select_check_out(
    disconnected: &[Span],
    check_in: Option<NaiveDateTime>,
    window: &ShiftWindow,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let check_in = check_in?;
    if now <= window.end {
        return None;
    }

    let candidates: Vec<NaiveDateTime> = disconnected
        .iter()
        .map(|s| s.start)
        .filter(|start| *start > check_in)
        .collect();

    let in_match_window = candidates
        .iter()
        .copied()
        .filter(|start| *start >= window.checkout_window_start && *start <= window.end)
        .max();
    if in_match_window.is_some() {
        return in_match_window;
    }

    candidates
        .into_iter()
        .max()
        .filter(|latest| *latest <= window.latest_valid_checkout)
}
