//! Upstream collaborators: schedules, worker identity, presence data.
//!
//! The engine reads everything it needs through these traits, once per
//! run. In-memory implementations are provided for embedding and tests.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::PresenceConfig;
use crate::error::EngineResult;
use crate::models::{RawWorkerIntervals, Schedule, Worker};
use crate::presence::{PresenceEvent, normalize_events};

/// Schedule lookup.
pub trait ScheduleSource: Send + Sync {
    /// Returns the schedule for one worker on `date`, if any.
    fn get_schedule(&self, worker_id: &str, date: NaiveDate) -> EngineResult<Option<Schedule>>;

    /// Returns every schedule for `date`, rest days included.
    fn schedules_for_date(&self, date: NaiveDate) -> EngineResult<Vec<Schedule>>;
}

/// Worker identity lookup.
pub trait WorkerDirectory: Send + Sync {
    /// Resolves a presence identifier to a worker id.
    fn resolve(&self, identifier: &str) -> Option<String>;
}

/// Presence interval supply.
pub trait PresenceSource: Send + Sync {
    /// Returns raw intervals for `date`, keyed by presence identifier.
    fn intervals_for_date(&self, date: NaiveDate)
    -> EngineResult<BTreeMap<String, RawWorkerIntervals>>;
}

/// Schedules held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduleSource {
    schedules: Vec<Schedule>,
}

impl InMemoryScheduleSource {
    /// Creates a source over the given schedules.
    pub fn new(schedules: Vec<Schedule>) -> Self {
        Self { schedules }
    }
}

impl ScheduleSource for InMemoryScheduleSource {
    fn get_schedule(&self, worker_id: &str, date: NaiveDate) -> EngineResult<Option<Schedule>> {
        Ok(self
            .schedules
            .iter()
            .find(|s| s.worker_id == worker_id && s.date == date)
            .cloned())
    }

    fn schedules_for_date(&self, date: NaiveDate) -> EngineResult<Vec<Schedule>> {
        Ok(self
            .schedules
            .iter()
            .filter(|s| s.date == date)
            .cloned()
            .collect())
    }
}

/// A worker registry held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkerDirectory {
    workers: Vec<Worker>,
}

impl InMemoryWorkerDirectory {
    /// Creates a directory over the given workers.
    pub fn new(workers: Vec<Worker>) -> Self {
        Self { workers }
    }
}

impl WorkerDirectory for InMemoryWorkerDirectory {
    fn resolve(&self, identifier: &str) -> Option<String> {
        self.workers
            .iter()
            .find(|w| w.answers_to(identifier))
            .map(|w| w.id.clone())
    }
}

/// Pre-grouped raw intervals held in memory, per date.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPresenceSource {
    by_date: BTreeMap<NaiveDate, BTreeMap<String, RawWorkerIntervals>>,
}

impl InMemoryPresenceSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the intervals for one identifier on one date.
    pub fn insert(
        &mut self,
        date: NaiveDate,
        identifier: impl Into<String>,
        intervals: RawWorkerIntervals,
    ) {
        self.by_date
            .entry(date)
            .or_default()
            .insert(identifier.into(), intervals);
    }
}

impl PresenceSource for InMemoryPresenceSource {
    fn intervals_for_date(
        &self,
        date: NaiveDate,
    ) -> EngineResult<BTreeMap<String, RawWorkerIntervals>> {
        Ok(self.by_date.get(&date).cloned().unwrap_or_default())
    }
}

/// Presence derived from a typed event log through [`normalize_events`].
#[derive(Debug, Clone)]
pub struct EventLogPresenceSource {
    events: Vec<PresenceEvent>,
    presence: PresenceConfig,
}

impl EventLogPresenceSource {
    /// Creates a source over `events`, classifying states with `presence`.
    pub fn new(events: Vec<PresenceEvent>, presence: PresenceConfig) -> Self {
        Self { events, presence }
    }
}

impl PresenceSource for EventLogPresenceSource {
    fn intervals_for_date(
        &self,
        date: NaiveDate,
    ) -> EngineResult<BTreeMap<String, RawWorkerIntervals>> {
        Ok(normalize_events(&self.events, date, &self.presence))
    }
}
