//! Reference presence normalizer.
//!
//! Turns typed presence state changes into the per-identifier connected and
//! disconnected interval lists the batch consumes. Parsing of vendor files
//! happens upstream; this works on already-typed records.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PresenceConfig;
use crate::models::{RawInterval, RawWorkerIntervals, sort_raw};

const START_FORMAT: &str = "%H:%M:%S";

/// One presence state as recorded by the telephony or chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEvent {
    /// The platform's identity for the worker, usually an agent email.
    pub identifier: String,
    /// When the state began.
    pub start: NaiveDateTime,
    /// When the state ended.
    pub end: NaiveDateTime,
    /// The platform's state name (AVAILABLE, OFFLINE, ...).
    pub state: String,
}

/// Groups presence events for `date` into raw intervals per identifier.
///
/// Events in an ignored state are dropped. Events starting on `date` are
/// kept with day offset 0, and events starting the following day with day
/// offset 1 so an overnight shift sees its morning tail; the engine discards
/// next-day records that fall outside the shift. Events on any other date are
/// dropped. Disconnected states go to the disconnected list, every other
/// state to the connected list. Durations are kept as fractional minutes,
/// negative ones included, so validation happens in one place downstream.
///
/// # Example
///
/// ```
/// use attendance_engine::config::PresenceConfig;
/// use attendance_engine::presence::{PresenceEvent, normalize_events};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// let at = |h, m| date.and_hms_opt(h, m, 0).unwrap();
/// let events = vec![
///     PresenceEvent {
///         identifier: "ana@example.com".to_string(),
///         start: at(8, 55),
///         end: at(12, 0),
///         state: "AVAILABLE".to_string(),
///     },
///     PresenceEvent {
///         identifier: "ana@example.com".to_string(),
///         start: at(12, 0),
///         end: at(12, 30),
///         state: "OFFLINE".to_string(),
///     },
/// ];
///
/// let grouped = normalize_events(&events, date, &PresenceConfig::default());
/// let ana = &grouped["ana@example.com"];
/// assert_eq!(ana.connected[0].start, "08:55:00");
/// assert_eq!(ana.connected[0].day_offset, Some(0));
/// assert_eq!(ana.disconnected[0].duration_minutes, 30.0);
/// ```
pub fn normalize_events(
    events: &[PresenceEvent],
    date: NaiveDate,
    presence: &PresenceConfig,
) -> BTreeMap<String, RawWorkerIntervals> {
    let mut grouped: BTreeMap<String, RawWorkerIntervals> = BTreeMap::new();
    let mut dropped = 0usize;

    for event in events {
        let day_offset = (event.start.date() - date).num_days();
        if presence.is_ignored(&event.state) || !(0..=1).contains(&day_offset) {
            dropped += 1;
            continue;
        }
        let identifier = event.identifier.trim();
        if identifier.is_empty() {
            dropped += 1;
            continue;
        }

        let seconds = (event.end - event.start).num_seconds();
        let interval = RawInterval::new(
            event.start.format(START_FORMAT).to_string(),
            seconds as f64 / 60.0,
        )
        .with_day_offset(day_offset as u32);
        let entry = grouped.entry(identifier.to_string()).or_default();
        if presence.is_disconnected(&event.state) {
            entry.disconnected.push(interval);
        } else {
            entry.connected.push(interval);
        }
    }

    for intervals in grouped.values_mut() {
        sort_raw(&mut intervals.connected);
        sort_raw(&mut intervals.disconnected);
    }

    debug!(
        date = %date,
        identifiers = grouped.len(),
        dropped,
        "Normalized presence events"
    );
    grouped
}
