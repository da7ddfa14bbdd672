//! Core data models for the attendance engine.
//!
//! This module contains all the domain models used throughout the engine.

mod interval;
mod outcome;
mod schedule;
mod worker;

pub use interval::{Interval, RawInterval, RawWorkerIntervals, WorkerIntervals};
pub(crate) use interval::sort_raw;
pub use outcome::{AttendanceOutcome, AttendanceStatus};
pub use schedule::Schedule;
pub use worker::Worker;
