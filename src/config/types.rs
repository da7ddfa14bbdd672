//! Configuration types for attendance reconciliation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every struct has a
//! `Default` that reproduces the engine's documented behavior, so fields
//! omitted from a file fall back to those values.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Metadata about the deployment the engine runs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMetadata {
    /// A human-readable name for the operation (e.g. a campaign or site).
    pub name: String,
    /// The version of the configuration set.
    pub version: String,
    /// The timezone presence data is localized to before it reaches the engine.
    pub timezone: String,
}

/// Tolerance windows used when reconciling one worker-day.
///
/// All windows are whole minutes. The defaults are a 3 hour early
/// check-in window, 10 minutes of lateness grace, a 5 minute checkout
/// window before shift end and a 3 hour overtime window after it.
///
/// # Example
///
/// ```
/// use attendance_engine::config::ToleranceConfig;
///
/// let tolerances = ToleranceConfig::default();
/// assert_eq!(tolerances.lateness_tolerance_minutes, 10);
/// assert_eq!(tolerances.early_checkin_window().num_hours(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    /// How early before shift start a connection still counts as check-in.
    pub early_checkin_window_minutes: u32,
    /// Grace period after shift start before a check-in is late.
    pub lateness_tolerance_minutes: u32,
    /// Width of the window ending at shift end in which a disconnect is the checkout.
    pub checkout_match_window_minutes: u32,
    /// Latest a disconnect may occur after shift end and still be the checkout.
    pub max_overtime_window_minutes: u32,
    /// Subtract the scheduled break window from offline minutes.
    pub exclude_break_from_offline: bool,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            early_checkin_window_minutes: 180,
            lateness_tolerance_minutes: 10,
            checkout_match_window_minutes: 5,
            max_overtime_window_minutes: 180,
            exclude_break_from_offline: false,
        }
    }
}

impl ToleranceConfig {
    /// Checks the windows are usable together.
    ///
    /// The early check-in window must stay under a day, otherwise an
    /// interval's time of day could not be placed unambiguously.
    pub fn validate(&self) -> EngineResult<()> {
        if self.early_checkin_window_minutes >= MINUTES_PER_DAY {
            return Err(EngineError::InvalidConfig {
                field: "early_checkin_window_minutes".to_string(),
                message: format!(
                    "must be less than {} minutes, got {}",
                    MINUTES_PER_DAY, self.early_checkin_window_minutes
                ),
            });
        }
        if self.max_overtime_window_minutes >= MINUTES_PER_DAY {
            return Err(EngineError::InvalidConfig {
                field: "max_overtime_window_minutes".to_string(),
                message: format!(
                    "must be less than {} minutes, got {}",
                    MINUTES_PER_DAY, self.max_overtime_window_minutes
                ),
            });
        }
        Ok(())
    }

    /// The early check-in window as a duration.
    pub fn early_checkin_window(&self) -> Duration {
        Duration::minutes(i64::from(self.early_checkin_window_minutes))
    }

    /// The lateness grace period as a duration.
    pub fn lateness_tolerance(&self) -> Duration {
        Duration::minutes(i64::from(self.lateness_tolerance_minutes))
    }

    /// The checkout match window as a duration.
    pub fn checkout_match_window(&self) -> Duration {
        Duration::minutes(i64::from(self.checkout_match_window_minutes))
    }

    /// The overtime window as a duration.
    pub fn max_overtime_window(&self) -> Duration {
        Duration::minutes(i64::from(self.max_overtime_window_minutes))
    }
}

/// How raw presence state names are classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// States that count as disconnected. Everything else is connected.
    pub disconnected_states: Vec<String>,
    /// States whose rows carry no information and are dropped.
    pub ignored_states: Vec<String>,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            disconnected_states: vec![
                "OFFLINE".to_string(),
                "UNAVAILABLE".to_string(),
                "BUSY".to_string(),
            ],
            ignored_states: vec!["DATA UNAVAILABLE".to_string()],
        }
    }
}

impl PresenceConfig {
    /// Returns true if `state` is a disconnected state (case-insensitive).
    pub fn is_disconnected(&self, state: &str) -> bool {
        contains_ignore_case(&self.disconnected_states, state)
    }

    /// Returns true if rows in `state` should be dropped (case-insensitive).
    pub fn is_ignored(&self, state: &str) -> bool {
        contains_ignore_case(&self.ignored_states, state)
    }
}

fn contains_ignore_case(states: &[String], state: &str) -> bool {
    let state = state.trim();
    states.iter().any(|s| s.trim().eq_ignore_ascii_case(state))
}

/// Settings for the batch orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Upper bound on concurrently reconciling workers in the async batch.
    pub max_concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_concurrency: 4 }
    }
}

impl BatchConfig {
    /// Rejects a pool without workers.
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_concurrency == 0 {
            return Err(EngineError::InvalidConfig {
                field: "max_concurrency".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Contents of `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineFile {
    /// Deployment metadata.
    pub engine: EngineMetadata,
    /// Batch settings.
    #[serde(default)]
    pub batch: BatchConfig,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    metadata: EngineMetadata,
    tolerances: ToleranceConfig,
    presence: PresenceConfig,
    batch: BatchConfig,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts, validating each.
    pub fn new(
        metadata: EngineMetadata,
        tolerances: ToleranceConfig,
        presence: PresenceConfig,
        batch: BatchConfig,
    ) -> EngineResult<Self> {
        tolerances.validate()?;
        batch.validate()?;
        Ok(Self {
            metadata,
            tolerances,
            presence,
            batch,
        })
    }

    /// Returns the deployment metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        &self.metadata
    }

    /// Returns the tolerance windows.
    pub fn tolerances(&self) -> &ToleranceConfig {
        &self.tolerances
    }

    /// Returns the presence state classification.
    pub fn presence(&self) -> &PresenceConfig {
        &self.presence
    }

    /// Returns the batch settings.
    pub fn batch(&self) -> &BatchConfig {
        &self.batch
    }
}
