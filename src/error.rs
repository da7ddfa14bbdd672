//! Error types for the attendance reconciliation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while reconciling attendance.
//! Per-worker errors are recovered by the batch and recorded in the run
//! report; only source reads and persistence surface as run-level errors.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the attendance engine.
///
/// # Example
///
/// ```
/// use attendance_engine::error::EngineError;
///
/// let error = EngineError::MissingWorker {
///     identifier: "agent@example.com".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown worker identity: agent@example.com");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value parsed but violates a constraint.
    #[error("Invalid configuration '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A worker has presence data but no schedule for the date.
    #[error("No schedule for worker '{worker_id}' on {date}")]
    MissingSchedule {
        /// The worker without a schedule.
        worker_id: String,
        /// The date that was reconciled.
        date: NaiveDate,
    },

    /// Presence data references an identity the worker directory cannot resolve.
    #[error("Unknown worker identity: {identifier}")]
    MissingWorker {
        /// The unresolved identifier (e.g. an agent email).
        identifier: String,
    },

    /// A presence interval has an unparsable start or an invalid duration.
    #[error("Malformed interval for worker '{worker_id}': {message}")]
    MalformedInterval {
        /// The worker the interval belongs to.
        worker_id: String,
        /// A description of what was wrong with the record.
        message: String,
    },

    /// A schedule cannot be reconciled against.
    #[error("Invalid schedule for worker '{worker_id}' on {date}: {message}")]
    InvalidSchedule {
        /// The worker the schedule belongs to.
        worker_id: String,
        /// The schedule date.
        date: NaiveDate,
        /// A description of the problem.
        message: String,
    },

    /// A bulk read from an upstream collaborator failed.
    #[error("Source '{source_name}' unavailable: {message}")]
    SourceUnavailable {
        /// Which collaborator failed (schedules, presence, ...).
        source_name: String,
        /// The underlying failure.
        message: String,
    },

    /// The atomic replace-for-date write failed. Nothing for the date changed.
    #[error("Failed to persist attendance for {date}: {message}")]
    PersistenceFailure {
        /// The date whose outcomes could not be replaced.
        date: NaiveDate,
        /// The underlying failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
