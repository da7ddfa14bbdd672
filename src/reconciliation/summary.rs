//! Daily KPI aggregation over attendance outcomes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceOutcome, AttendanceStatus};

/// Totals and rates for one day of attendance.
///
/// Rates are percentages rounded to two decimal places. A rate whose
/// denominator is zero is reported as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Number of outcomes considered, one per scheduled worker.
    pub scheduled: usize,
    /// Workers who checked in within the lateness tolerance.
    pub present: usize,
    /// Workers who checked in after the lateness tolerance.
    pub late: usize,
    /// Workers with no valid check-in.
    pub absent: usize,
    /// Share of scheduled workers who attended, as a percentage.
    pub attendance_rate: Decimal,
    /// Share of attending workers who were on time, as a percentage.
    pub punctuality_rate: Decimal,
    /// Offline minutes summed over every worker.
    pub total_offline_minutes: i64,
    /// Out-of-adherence minutes summed over every worker.
    pub total_out_of_adherence_minutes: i64,
}

impl DailySummary {
    /// Aggregates a day's outcomes.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::reconciliation::DailySummary;
    /// use rust_decimal::Decimal;
    ///
    /// let summary = DailySummary::from_outcomes(&[]);
    /// assert_eq!(summary.scheduled, 0);
    /// assert_eq!(summary.attendance_rate, Decimal::ZERO);
    /// ```
    pub fn from_outcomes(outcomes: &[AttendanceOutcome]) -> Self {
        let count = |status: AttendanceStatus| outcomes.iter().filter(|o| o.status == status).count();
        let present = count(AttendanceStatus::Present);
        let late = count(AttendanceStatus::Late);
        let absent = count(AttendanceStatus::Absent);
        let attended = outcomes.iter().filter(|o| o.attended()).count();

        Self {
            scheduled: outcomes.len(),
            present,
            late,
            absent,
            attendance_rate: percentage(attended, outcomes.len()),
            punctuality_rate: percentage(present, attended),
            total_offline_minutes: outcomes.iter().map(|o| o.offline_minutes).sum(),
            total_out_of_adherence_minutes: outcomes
                .iter()
                .map(|o| o.out_of_adherence_minutes)
                .sum(),
        }
    }
}

fn percentage(part: usize, whole: usize) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole)).round_dp(2)
}
