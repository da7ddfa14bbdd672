//! Batch orchestration over every scheduled worker for a date.
//!
//! The batch resolves presence identifiers to workers, pairs each non-rest
//! schedule with that worker's intervals and reconciles them. Problems with
//! a single worker are recorded and never stop the rest of the batch:
//!
//! - identifiers the directory cannot resolve go to `missing_workers`,
//! - resolved workers with presence but no schedule go to `unscheduled`,
//! - a worker whose reconciliation fails goes to `failures`.
//!
//! Presence dated only on the following day is the tail of an overnight
//! shift. It is reconciled when a schedule claims it and is otherwise
//! ignored, since it says nothing about activity on the date itself.
//!
//! [`run_for_date`] and [`run_for_date_concurrent`] produce identical results;
//! the concurrent form spreads the work over a bounded pool of blocking tasks.

use std::collections::{BTreeMap, BTreeSet};
use std::panic::{AssertUnwindSafe, catch_unwind};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::config::ToleranceConfig;
use crate::error::EngineError;
use crate::models::{AttendanceOutcome, RawWorkerIntervals, Schedule, WorkerIntervals};
use crate::sources::WorkerDirectory;

use super::engine::reconcile;

/// A worker whose reconciliation failed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerFailure {
    /// The worker that failed.
    pub worker_id: String,
    /// Why it failed.
    pub reason: String,
}

/// Everything a batch run produced for one date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// One outcome per reconciled worker, sorted by worker id.
    pub outcomes: Vec<AttendanceOutcome>,
    /// Presence identifiers the worker directory could not resolve.
    pub missing_workers: Vec<String>,
    /// Workers with presence data but no schedule for the date.
    pub unscheduled: Vec<String>,
    /// Workers whose reconciliation failed.
    pub failures: Vec<WorkerFailure>,
}

/// A single unit of batch work: one schedule and its worker's intervals.
#[derive(Debug, Clone)]
struct WorkerJob {
    schedule: Schedule,
    intervals: RawWorkerIntervals,
}

#[derive(Debug, Default)]
struct BatchPlan {
    jobs: Vec<WorkerJob>,
    missing_workers: Vec<String>,
    unscheduled: Vec<String>,
}

/// Reconciles every scheduled worker for `date`, one after another.
///
/// # Arguments
///
/// * `date` - The date to reconcile
/// * `schedules` - Schedules to consider; other dates and rest days are skipped
/// * `events` - Raw intervals keyed by presence identifier
/// * `directory` - Resolves presence identifiers to worker ids
/// * `now` - The run time, used to detect shifts still in progress
/// * `tolerances` - The tolerance windows to apply
pub fn run_for_date<D: WorkerDirectory + ?Sized>(
    date: NaiveDate,
    schedules: &[Schedule],
    events: &BTreeMap<String, RawWorkerIntervals>,
    directory: &D,
    now: NaiveDateTime,
    tolerances: &ToleranceConfig,
) -> BatchResult {
    let plan = plan_batch(date, schedules, events, directory);
    let results = plan
        .jobs
        .iter()
        .map(|job| execute_job(job, now, tolerances))
        .collect();
    assemble(plan.missing_workers, plan.unscheduled, results)
}

/// Reconciles every scheduled worker for `date` on a bounded worker pool.
///
/// Jobs are split into at most `max_concurrency` chunks, each reconciled
/// on its own blocking task. The result is the same as [`run_for_date`].
pub async fn run_for_date_concurrent<D: WorkerDirectory + ?Sized>(
    date: NaiveDate,
    schedules: &[Schedule],
    events: &BTreeMap<String, RawWorkerIntervals>,
    directory: &D,
    now: NaiveDateTime,
    tolerances: &ToleranceConfig,
    max_concurrency: usize,
) -> BatchResult {
    let plan = plan_batch(date, schedules, events, directory);
    if plan.jobs.is_empty() {
        return assemble(plan.missing_workers, plan.unscheduled, Vec::new());
    }

    let chunk_size = plan.jobs.len().div_ceil(max_concurrency.max(1));
    let mut handles = Vec::new();
    for chunk in plan.jobs.chunks(chunk_size) {
        let worker_ids: Vec<String> = chunk.iter().map(|j| j.schedule.worker_id.clone()).collect();
        let chunk = chunk.to_vec();
        let tolerances = tolerances.clone();
        let span = tracing::Span::current();
        let handle = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            chunk
                .iter()
                .map(|job| execute_job(job, now, &tolerances))
                .collect::<Vec<_>>()
        });
        handles.push((worker_ids, handle));
    }
    debug!(date = %date, tasks = handles.len(), "Dispatched reconciliation tasks");

    let mut results = Vec::with_capacity(plan.jobs.len());
    for (worker_ids, handle) in handles {
        match handle.await {
            Ok(chunk_results) => results.extend(chunk_results),
            Err(err) => {
                error!(date = %date, error = %err, "Reconciliation task did not complete");
                results.extend(worker_ids.into_iter().map(|worker_id| {
                    Err(WorkerFailure {
                        worker_id,
                        reason: format!("reconciliation task did not complete: {}", err),
                    })
                }));
            }
        }
    }

    assemble(plan.missing_workers, plan.unscheduled, results)
}

/// Resolves identities and pairs schedules with presence data.
fn plan_batch<D: WorkerDirectory + ?Sized>(
    date: NaiveDate,
    schedules: &[Schedule],
    events: &BTreeMap<String, RawWorkerIntervals>,
    directory: &D,
) -> BatchPlan {
    let mut plan = BatchPlan::default();

    let mut by_worker: BTreeMap<String, RawWorkerIntervals> = BTreeMap::new();
    for (identifier, intervals) in events {
        match directory.resolve(identifier) {
            Some(worker_id) => by_worker.entry(worker_id).or_default().merge(intervals.clone()),
            None if intervals.is_next_day_only() => {
                debug!(identifier = %identifier, "Ignoring next-day presence for unknown worker");
            }
            None => {
                let err = EngineError::MissingWorker {
                    identifier: identifier.clone(),
                };
                warn!(date = %date, error = %err, "Skipping presence for unknown worker");
                plan.missing_workers.push(identifier.clone());
            }
        }
    }

    let mut scheduled: BTreeSet<String> = BTreeSet::new();
    for schedule in schedules.iter().filter(|s| s.date == date) {
        if !scheduled.insert(schedule.worker_id.clone()) {
            warn!(
                worker_id = %schedule.worker_id,
                date = %date,
                "Duplicate schedule ignored, keeping the first"
            );
            continue;
        }
        if schedule.is_rest_day {
            debug!(worker_id = %schedule.worker_id, date = %date, "Rest day, not reconciled");
            continue;
        }
        plan.jobs.push(WorkerJob {
            schedule: schedule.clone(),
            intervals: by_worker.get(&schedule.worker_id).cloned().unwrap_or_default(),
        });
    }

    for (worker_id, raw) in &by_worker {
        if scheduled.contains(worker_id) || raw.is_next_day_only() {
            continue;
        }
        let err = EngineError::MissingSchedule {
            worker_id: worker_id.clone(),
            date,
        };
        warn!(error = %err, "Presence without schedule");
        plan.unscheduled.push(worker_id.clone());
    }

    plan
}

/// Reconciles one job, turning errors and panics into a failure record.
fn execute_job(
    job: &WorkerJob,
    now: NaiveDateTime,
    tolerances: &ToleranceConfig,
) -> Result<AttendanceOutcome, WorkerFailure> {
    let worker_id = &job.schedule.worker_id;
    let attempt = catch_unwind(AssertUnwindSafe(|| {
        let intervals = WorkerIntervals::from_raw(&job.intervals, worker_id);
        reconcile(
            &intervals.connected,
            &intervals.disconnected,
            &job.schedule,
            now,
            tolerances,
        )
    }));

    let reason = match attempt {
        Ok(Ok(outcome)) => return Ok(outcome),
        Ok(Err(err)) => err.to_string(),
        Err(_) => "reconciliation panicked".to_string(),
    };
    warn!(worker_id = %worker_id, reason = %reason, "Worker excluded from batch");
    Err(WorkerFailure {
        worker_id: worker_id.clone(),
        reason,
    })
}

fn assemble(
    mut missing_workers: Vec<String>,
    mut unscheduled: Vec<String>,
    results: Vec<Result<AttendanceOutcome, WorkerFailure>>,
) -> BatchResult {
    let (mut outcomes, mut failures): (Vec<_>, Vec<_>) = (Vec::new(), Vec::new());
    for result in results {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(failure) => failures.push(failure),
        }
    }

    outcomes.sort_by(|a, b| a.worker_id.cmp(&b.worker_id));
    failures.sort();
    missing_workers.sort();
    missing_workers.dedup();
    unscheduled.sort();
    unscheduled.dedup();

    BatchResult {
        outcomes,
        missing_workers,
        unscheduled,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceStatus, RawInterval, Worker};
    use crate::sources::InMemoryWorkerDirectory;
    use chrono::NaiveTime;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn now() -> NaiveDateTime {
        date().and_time(time(23, 0))
    }

    fn schedule(worker_id: &str) -> Schedule {
        Schedule {
            worker_id: worker_id.to_string(),
            date: date(),
            shift_start: time(9, 0),
            shift_end: time(17, 0),
            break_start: None,
            break_end: None,
            is_rest_day: false,
        }
    }

    fn worker(id: &str, email: &str) -> Worker {
        Worker {
            id: id.to_string(),
            name: id.to_string(),
            presence_identifiers: vec![email.to_string()],
        }
    }

    fn directory() -> InMemoryWorkerDirectory {
        InMemoryWorkerDirectory::new(vec![
            worker("W-1", "one@example.com"),
            worker("W-2", "two@example.com"),
            worker("W-3", "three@example.com"),
        ])
    }

    fn present_day() -> RawWorkerIntervals {
        RawWorkerIntervals {
            connected: vec![RawInterval::new("08:58", 480.0)],
            disconnected: vec![RawInterval::new("16:58", 10.0)],
        }
    }

    #[test]
    fn test_worker_without_events_is_absent() {
        let result = run_for_date(
            date(),
            &[schedule("W-1")],
            &BTreeMap::new(),
            &directory(),
            now(),
            &ToleranceConfig::default(),
        );
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(result.outcomes[0].status, AttendanceStatus::Absent);
        assert_eq!(result.outcomes[0].offline_minutes, 480);
    }

    #[test]
    fn test_unknown_identifier_is_missing_worker() {
        let mut events = BTreeMap::new();
        events.insert("ghost@example.com".to_string(), present_day());
        events.insert("one@example.com".to_string(), present_day());

        let result = run_for_date(
            date(),
            &[schedule("W-1")],
            &events,
            &directory(),
            now(),
            &ToleranceConfig::default(),
        );
        assert_eq!(result.missing_workers, vec!["ghost@example.com".to_string()]);
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(result.outcomes[0].status, AttendanceStatus::Present);
    }

    #[test]
    fn test_presence_without_schedule_is_unscheduled() {
        let mut events = BTreeMap::new();
        events.insert("two@example.com".to_string(), present_day());

        let result = run_for_date(
            date(),
            &[schedule("W-1")],
            &events,
            &directory(),
            now(),
            &ToleranceConfig::default(),
        );
        assert_eq!(result.unscheduled, vec!["W-2".to_string()]);
        assert!(result.outcomes.iter().all(|o| o.worker_id != "W-2"));
    }

    #[test]
    fn test_rest_days_and_other_dates_are_skipped() {
        let mut rest = schedule("W-2");
        rest.is_rest_day = true;
        let mut tomorrow = schedule("W-3");
        tomorrow.date = date().succ_opt().unwrap();

        let mut events = BTreeMap::new();
        events.insert("two@example.com".to_string(), present_day());

        let result = run_for_date(
            date(),
            &[schedule("W-1"), rest, tomorrow],
            &events,
            &directory(),
            now(),
            &ToleranceConfig::default(),
        );
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(result.outcomes[0].worker_id, "W-1");
        assert!(result.unscheduled.is_empty());
    }

    #[test]
    fn test_invalid_schedule_is_recorded_not_fatal() {
        let mut broken = schedule("W-2");
        broken.shift_end = broken.shift_start;

        let result = run_for_date(
            date(),
            &[schedule("W-1"), broken, schedule("W-3")],
            &BTreeMap::new(),
            &directory(),
            now(),
            &ToleranceConfig::default(),
        );
        assert_eq!(result.outcomes.len(), 2);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].worker_id, "W-2");
        assert!(result.failures[0].reason.contains("Invalid schedule"));
    }

    #[test]
    fn test_malformed_interval_dropped_worker_still_reconciled() {
        let mut events = BTreeMap::new();
        events.insert(
            "one@example.com".to_string(),
            RawWorkerIntervals {
                connected: vec![RawInterval::new("bogus", 5.0), RawInterval::new("09:20", 400.0)],
                disconnected: vec![RawInterval::new("12:00", -4.0)],
            },
        );

        let result = run_for_date(
            date(),
            &[schedule("W-1")],
            &events,
            &directory(),
            now(),
            &ToleranceConfig::default(),
        );
        assert!(result.failures.is_empty());
        assert_eq!(result.outcomes[0].status, AttendanceStatus::Late);
        assert_eq!(result.outcomes[0].check_in, Some(time(9, 20)));
    }

    #[test]
    fn test_duplicate_schedule_yields_single_outcome() {
        let mut second = schedule("W-1");
        second.shift_start = time(12, 0);

        let result = run_for_date(
            date(),
            &[schedule("W-1"), second],
            &BTreeMap::new(),
            &directory(),
            now(),
            &ToleranceConfig::default(),
        );
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(result.outcomes[0].offline_minutes, 480);
    }

    #[test]
    fn test_outcomes_sorted_by_worker() {
        let result = run_for_date(
            date(),
            &[schedule("W-3"), schedule("W-1"), schedule("W-2")],
            &BTreeMap::new(),
            &directory(),
            now(),
            &ToleranceConfig::default(),
        );
        let ids: Vec<&str> = result.outcomes.iter().map(|o| o.worker_id.as_str()).collect();
        assert_eq!(ids, vec!["W-1", "W-2", "W-3"]);
    }

    #[test]
    fn test_next_day_only_presence_not_reported() {
        let tail = RawWorkerIntervals {
            connected: vec![RawInterval::new("00:00", 360.0).with_day_offset(1)],
            disconnected: vec![RawInterval::new("06:03", 60.0).with_day_offset(1)],
        };
        let mut events = BTreeMap::new();
        events.insert("two@example.com".to_string(), tail.clone());
        events.insert("ghost@example.com".to_string(), tail);

        let result = run_for_date(
            date(),
            &[schedule("W-1")],
            &events,
            &directory(),
            now(),
            &ToleranceConfig::default(),
        );
        assert!(result.unscheduled.is_empty());
        assert!(result.missing_workers.is_empty());
        assert_eq!(result.outcomes.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let schedules: Vec<Schedule> = (0..25).map(|i| schedule(&format!("W-{}", i))).collect();
        let workers: Vec<Worker> = (0..25)
            .map(|i| worker(&format!("W-{}", i), &format!("w{}@example.com", i)))
            .collect();
        let directory = InMemoryWorkerDirectory::new(workers);
        let mut events = BTreeMap::new();
        for i in (0..25).step_by(2) {
            events.insert(format!("w{}@example.com", i), present_day());
        }
        events.insert("stranger@example.com".to_string(), present_day());

        let sequential = run_for_date(
            date(),
            &schedules,
            &events,
            &directory,
            now(),
            &ToleranceConfig::default(),
        );
        let concurrent = run_for_date_concurrent(
            date(),
            &schedules,
            &events,
            &directory,
            now(),
            &ToleranceConfig::default(),
            4,
        )
        .await;

        assert_eq!(sequential, concurrent);
        assert_eq!(concurrent.outcomes.len(), 25);
        assert_eq!(concurrent.missing_workers, vec!["stranger@example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_with_no_jobs() {
        let result = run_for_date_concurrent(
            date(),
            &[],
            &BTreeMap::new(),
            &directory(),
            now(),
            &ToleranceConfig::default(),
            4,
        )
        .await;
        assert_eq!(result, BatchResult::default());
    }
}
