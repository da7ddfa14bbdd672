//! Attendance persistence.
//!
//! Outcomes for a date are always replaced as a whole. A reader sees either
//! the previous set for the date or the new one, never a mix.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::AttendanceOutcome;

/// Storage for reconciled outcomes.
pub trait AttendanceStore: Send + Sync {
    /// Atomically replaces every outcome stored for `date`.
    ///
    /// Returns the number of outcomes inserted. On error nothing for the
    /// date has changed.
    fn replace_for_date(
        &self,
        date: NaiveDate,
        outcomes: Vec<AttendanceOutcome>,
    ) -> EngineResult<usize>;

    /// Returns the outcomes stored for `date`, sorted by worker id.
    fn outcomes_for_date(&self, date: NaiveDate) -> EngineResult<Vec<AttendanceOutcome>>;
}

/// An [`AttendanceStore`] held in memory.
#[derive(Debug, Default)]
pub struct InMemoryAttendanceStore {
    days: RwLock<BTreeMap<NaiveDate, Vec<AttendanceOutcome>>>,
}

impl InMemoryAttendanceStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttendanceStore for InMemoryAttendanceStore {
    fn replace_for_date(
        &self,
        date: NaiveDate,
        mut outcomes: Vec<AttendanceOutcome>,
    ) -> EngineResult<usize> {
        if let Some(stray) = outcomes.iter().find(|o| o.date != date) {
            return Err(EngineError::PersistenceFailure {
                date,
                message: format!(
                    "outcome for worker '{}' is dated {}",
                    stray.worker_id, stray.date
                ),
            });
        }
        outcomes.sort_by(|a, b| a.worker_id.cmp(&b.worker_id));
        let inserted = outcomes.len();

        let mut days = self
            .days
            .write()
            .map_err(|_| EngineError::PersistenceFailure {
                date,
                message: "store lock poisoned".to_string(),
            })?;
        let replaced = days.insert(date, outcomes).map_or(0, |old| old.len());

        debug!(date = %date, inserted, replaced, "Replaced attendance for date");
        Ok(inserted)
    }

    fn outcomes_for_date(&self, date: NaiveDate) -> EngineResult<Vec<AttendanceOutcome>> {
        let days = self
            .days
            .read()
            .map_err(|_| EngineError::PersistenceFailure {
                date,
                message: "store lock poisoned".to_string(),
            })?;
        Ok(days.get(&date).cloned().unwrap_or_default())
    }
}
