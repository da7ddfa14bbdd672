//! The run entry point the surrounding application calls.
//!
//! [`AttendanceService`] owns the configuration and the collaborators. A run
//! reads schedules and presence once, reconciles the batch and replaces the
//! stored outcomes for the date in a single write.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::config::{ConfigLoader, ToleranceConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceOutcome, RawWorkerIntervals, WorkerIntervals};
use crate::reconciliation::{DailySummary, WorkerFailure, reconcile, run_for_date_concurrent};
use crate::sources::{PresenceSource, ScheduleSource, WorkerDirectory};
use crate::store::AttendanceStore;

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Identifier of this run, carried by the `attendance_run` span around
    /// every log event the run emitted.
    pub run_id: Uuid,
    /// The reconciled date.
    pub date: NaiveDate,
    /// Number of outcomes written.
    pub inserted_count: usize,
    /// Presence identifiers no worker answers to.
    pub missing_workers: Vec<String>,
    /// Workers with presence but no schedule.
    pub unscheduled: Vec<String>,
    /// Workers whose reconciliation failed.
    pub failures: Vec<WorkerFailure>,
}

/// Reconciles attendance and serves the results.
///
/// Cloning is cheap; clones share configuration and collaborators.
#[derive(Clone)]
pub struct AttendanceService {
    config: Arc<ConfigLoader>,
    schedules: Arc<dyn ScheduleSource>,
    directory: Arc<dyn WorkerDirectory>,
    presence: Arc<dyn PresenceSource>,
    store: Arc<dyn AttendanceStore>,
}

impl AttendanceService {
    /// Creates a service over the given configuration and collaborators.
    pub fn new(
        config: ConfigLoader,
        schedules: Arc<dyn ScheduleSource>,
        directory: Arc<dyn WorkerDirectory>,
        presence: Arc<dyn PresenceSource>,
        store: Arc<dyn AttendanceStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            schedules,
            directory,
            presence,
            store,
        }
    }

    /// Returns the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Reconciles every scheduled worker for `date` and persists the outcomes.
    ///
    /// `tolerances` overrides the configured tolerances for this run only.
    /// Per-worker problems are reported in the [`RunReport`]; the run itself
    /// fails only when an override is invalid, a bulk read fails or the
    /// outcomes cannot be persisted. A failed run leaves the stored outcomes
    /// for `date` untouched.
    ///
    /// Every event the run emits, including those from the batch workers,
    /// is inside an `attendance_run` span carrying the run id, the date and
    /// the configured timezone.
    pub async fn run_for_date(
        &self,
        date: NaiveDate,
        now: NaiveDateTime,
        tolerances: Option<ToleranceConfig>,
    ) -> EngineResult<RunReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "attendance_run",
            run_id = %run_id,
            date = %date,
            timezone = %self.config.metadata().timezone
        );
        self.execute_run(run_id, date, now, tolerances)
            .instrument(span)
            .await
    }

    async fn execute_run(
        &self,
        run_id: Uuid,
        date: NaiveDate,
        now: NaiveDateTime,
        tolerances: Option<ToleranceConfig>,
    ) -> EngineResult<RunReport> {
        let start_time = Instant::now();
        info!("Starting attendance run");

        let tolerances = match tolerances {
            Some(overridden) => {
                overridden.validate().inspect_err(|err| {
                    error!(error = %err, "Rejected tolerance override");
                })?;
                info!("Using tolerance override");
                overridden
            }
            None => self.config.tolerances().clone(),
        };

        let schedules = self.schedules.schedules_for_date(date).inspect_err(|err| {
            error!(error = %err, "Failed to read schedules");
        })?;
        let events = self.presence.intervals_for_date(date).inspect_err(|err| {
            error!(error = %err, "Failed to read presence");
        })?;

        let batch = run_for_date_concurrent(
            date,
            &schedules,
            &events,
            self.directory.as_ref(),
            now,
            &tolerances,
            self.config.config().batch().max_concurrency,
        )
        .await;

        let inserted_count = self
            .store
            .replace_for_date(date, batch.outcomes)
            .inspect_err(|err| {
                error!(error = %err, "Attendance run failed, nothing persisted");
            })?;

        let duration_us = start_time.elapsed().as_micros() as u64;
        info!(
            inserted_count,
            missing_workers = batch.missing_workers.len(),
            unscheduled = batch.unscheduled.len(),
            failures = batch.failures.len(),
            duration_us,
            "Attendance run completed"
        );

        Ok(RunReport {
            run_id,
            date,
            inserted_count,
            missing_workers: batch.missing_workers,
            unscheduled: batch.unscheduled,
            failures: batch.failures,
        })
    }

    /// Reconciles a single worker without persisting anything.
    ///
    /// Presence from every identifier the worker answers to is combined.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingSchedule`] when the worker has no
    /// schedule for `date`, and propagates source and schedule errors.
    pub fn reconcile_worker(
        &self,
        worker_id: &str,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> EngineResult<AttendanceOutcome> {
        let schedule = self.schedules.get_schedule(worker_id, date)?.ok_or_else(|| {
            EngineError::MissingSchedule {
                worker_id: worker_id.to_string(),
                date,
            }
        })?;

        let mut raw = RawWorkerIntervals::default();
        for (identifier, intervals) in self.presence.intervals_for_date(date)? {
            if self.directory.resolve(&identifier).as_deref() == Some(worker_id) {
                raw.merge(intervals);
            }
        }

        let intervals = WorkerIntervals::from_raw(&raw, worker_id);
        reconcile(
            &intervals.connected,
            &intervals.disconnected,
            &schedule,
            now,
            self.config.tolerances(),
        )
    }

    /// Stored outcomes for `date`, with an absent placeholder for every
    /// scheduled worker that has none yet.
    ///
    /// Rest days and zero-length shifts get no placeholder. The result is
    /// sorted by worker id.
    pub fn daily_view(&self, date: NaiveDate) -> EngineResult<Vec<AttendanceOutcome>> {
        let mut view = self.store.outcomes_for_date(date)?;
        let mut seen: BTreeSet<String> = view.iter().map(|o| o.worker_id.clone()).collect();

        for schedule in self.schedules.schedules_for_date(date)? {
            if schedule.is_rest_day || schedule.shift_start == schedule.shift_end {
                continue;
            }
            if seen.insert(schedule.worker_id.clone()) {
                view.push(AttendanceOutcome::absent(&schedule));
            }
        }

        view.sort_by(|a, b| a.worker_id.cmp(&b.worker_id));
        Ok(view)
    }

    /// KPI totals over [`AttendanceService::daily_view`].
    pub fn daily_summary(&self, date: NaiveDate) -> EngineResult<DailySummary> {
        Ok(DailySummary::from_outcomes(&self.daily_view(date)?))
    }
}
