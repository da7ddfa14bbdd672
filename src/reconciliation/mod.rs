//! Attendance reconciliation.
//!
//! This module turns a worker's presence intervals and schedule into an
//! [`crate::models::AttendanceOutcome`]. Each step lives in its own module:
//!
//! - [`window`]: places the shift and its tolerance bounds on the calendar
//! - [`check_in`]: selects the check-in and classifies present, late or absent
//! - [`check_out`]: selects the checkout once the shift has ended
//! - [`offline`]: sums offline minutes inside the shift
//! - [`adherence`]: sums connected minutes past the scheduled end
//! - [`engine`]: the single-worker entry point tying the steps together
//! - [`batch`]: reconciles every scheduled worker for a date
//! - [`summary`]: aggregates a day's outcomes into KPI totals

pub mod adherence;
pub mod batch;
pub mod check_in;
pub mod check_out;
pub mod engine;
pub mod offline;
pub mod spans;
pub mod summary;
pub mod window;

pub use adherence::out_of_adherence_minutes;
pub use batch::{BatchResult, WorkerFailure, run_for_date, run_for_date_concurrent};
pub use check_in::{CheckInSelection, select_check_in};
pub use check_out::select_check_out;
pub use engine::reconcile;
pub use offline::{OfflineInputs, offline_minutes};
pub use spans::{Span, merge_spans, subtract_span, total_minutes};
pub use summary::DailySummary;
pub use window::ShiftWindow;
