//! Attendance reconciliation engine for workforce presence logs.
//!
//! This crate turns per-worker presence intervals (connected and
//! disconnected periods from a telephony or chat platform) and shift
//! schedules into daily attendance outcomes: check-in, checkout, status,
//! offline minutes and out-of-adherence minutes.
//!
//! The single-worker computation in [`reconciliation::reconcile`] is pure.
//! [`service::AttendanceService`] wraps it with bulk reads, a bounded
//! concurrent batch and an atomic replace-for-date write.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod models;
pub mod presence;
pub mod reconciliation;
pub mod service;
pub mod sources;
pub mod store;
